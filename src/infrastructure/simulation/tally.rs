//! Pick counters

use std::collections::HashMap;

/// Counts picks per variation key, remembering first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
    unassigned: u64,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one pick of `key`
    pub fn count(&mut self, key: impl Into<String>) {
        let key = key.into();

        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    /// Count one pick that returned no variation
    pub fn count_unassigned(&mut self) {
        self.unassigned += 1;
    }

    pub fn count_of(&self, key: &str) -> u64 {
        self.index
            .get(key)
            .map_or(0, |&position| self.entries[position].1)
    }

    pub fn unassigned(&self) -> u64 {
        self.unassigned
    }

    /// Total picks counted, assigned or not
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum::<u64>() + self.unassigned
    }

    /// Counts in first-seen order
    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }
}
