//! Deterministic weighted round-robin distributor
//!
//! A [`Distributor`] turns an ordered list of weights into a repeatable
//! sequence of slot indices. After every full lap each slot has been returned
//! exactly in proportion to its weight, and slots are interleaved so that no
//! slot is starved for long stretches within a lap.
//!
//! Two schedules are available:
//!
//! - [`DistributionStrategy::Interleaved`]: the classic interleaved weighted
//!   round-robin used by load-balancing schedulers. A cursor walks the slots
//!   while a threshold steps down from the largest weight by the gcd of the
//!   weights; a slot is returned when its weight reaches the threshold.
//! - [`DistributionStrategy::Smooth`]: the "smooth" variant popularised by
//!   nginx. Every slot accumulates its weight each call and the leader pays
//!   back the total. Counts stay within one of the ideal share at every
//!   prefix, not only at lap boundaries.
//!
//! [`DistributionStrategy::Interleaved`] only bounds the error per lap:
//! `[1, 1, 1, 10]` hands its first nine calls to the heavy slot.
//!
//! Both strategies break ties by slot order, so `[1, 1, 1]` yields
//! `0, 1, 2, 0, 1, 2, ...`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::validation::validate_weight;
use crate::domain::ExperimentError;

/// Largest number of decimal places honoured when scaling real weights
const MAX_WEIGHT_DECIMALS: i32 = 9;

/// Relative tolerance for treating a scaled weight as an integer
const INTEGRAL_TOLERANCE: f64 = 1e-9;

/// Scheduling strategy used by a [`Distributor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistributionStrategy {
    /// Cursor and threshold interleaving
    #[default]
    Interleaved,
    /// Accumulate-and-pay-back interleaving with bounded per-prefix error
    Smooth,
}

impl fmt::Display for DistributionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interleaved => write!(f, "interleaved"),
            Self::Smooth => write!(f, "smooth"),
        }
    }
}

/// Scale real weights to integers sharing a common power-of-ten denominator
///
/// `[0.5, 0.25, 0.25]` becomes `[50, 25, 25]`. Weights with more than nine
/// significant decimals are rounded at the ninth.
pub fn normalize_weights(weights: &[f64]) -> Result<Vec<u64>, ExperimentError> {
    for &weight in weights {
        validate_weight(weight)?;
    }

    let decimals = (0..=MAX_WEIGHT_DECIMALS)
        .find(|&decimals| {
            let scale = 10f64.powi(decimals);
            weights.iter().all(|w| is_integral(w * scale))
        })
        .unwrap_or(MAX_WEIGHT_DECIMALS);
    let scale = 10f64.powi(decimals);

    let mut total: u64 = 0;
    let mut scaled = Vec::with_capacity(weights.len());

    for &weight in weights {
        let value = (weight * scale).round();

        if value >= u64::MAX as f64 {
            return Err(ExperimentError::invalid_weight(format!(
                "weight {} is too large",
                weight
            )));
        }

        let value = value as u64;

        if weight > 0.0 && value == 0 {
            return Err(ExperimentError::invalid_weight(format!(
                "weight {} is too small to represent",
                weight
            )));
        }

        total = total.checked_add(value).ok_or_else(|| {
            ExperimentError::invalid_weight("sum of weights is too large")
        })?;
        scaled.push(value);
    }

    Ok(scaled)
}

fn is_integral(value: f64) -> bool {
    (value - value.round()).abs() <= INTEGRAL_TOLERANCE * value.abs().max(1.0)
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

// ============================================================================
// Schedule state
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct InterleavedState {
    /// Last returned slot, `None` before the first call
    cursor: Option<usize>,
    current_threshold: u64,
    max_weight: u64,
    weight_step: u64,
}

impl InterleavedState {
    fn new(weights: &[u64]) -> Self {
        let max_weight = weights.iter().copied().max().unwrap_or(0);
        let weight_step = weights
            .iter()
            .copied()
            .filter(|w| *w > 0)
            .fold(0, gcd);

        Self {
            cursor: None,
            current_threshold: 0,
            max_weight,
            weight_step,
        }
    }

    fn next(&mut self, weights: &[u64]) -> Result<usize, ExperimentError> {
        if self.max_weight == 0 {
            return Err(ExperimentError::ExhaustedDistributor);
        }

        // Terminates: the slot holding max_weight clears any threshold.
        loop {
            let cursor = self.cursor.map_or(0, |c| (c + 1) % weights.len());
            self.cursor = Some(cursor);

            if cursor == 0 {
                self.current_threshold = if self.current_threshold <= self.weight_step {
                    self.max_weight
                } else {
                    self.current_threshold - self.weight_step
                };
            }

            if weights[cursor] >= self.current_threshold {
                return Ok(cursor);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SmoothState {
    current: Vec<i128>,
    total: u64,
}

impl SmoothState {
    fn new(weights: &[u64]) -> Self {
        Self {
            current: vec![0; weights.len()],
            total: weights.iter().sum(),
        }
    }

    fn next(&mut self, weights: &[u64]) -> Result<usize, ExperimentError> {
        if self.total == 0 {
            return Err(ExperimentError::ExhaustedDistributor);
        }

        let mut best = 0;

        for (index, weight) in weights.iter().enumerate() {
            self.current[index] += i128::from(*weight);

            if self.current[index] > self.current[best] {
                best = index;
            }
        }

        self.current[best] -= i128::from(self.total);
        Ok(best)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScheduleState {
    Interleaved(InterleavedState),
    Smooth(SmoothState),
}

impl ScheduleState {
    fn new(strategy: DistributionStrategy, weights: &[u64]) -> Self {
        match strategy {
            DistributionStrategy::Interleaved => Self::Interleaved(InterleavedState::new(weights)),
            DistributionStrategy::Smooth => Self::Smooth(SmoothState::new(weights)),
        }
    }
}

// ============================================================================
// Distributor
// ============================================================================

/// Stateful weighted round-robin over a fixed list of integer weights
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distributor {
    weights: Vec<u64>,
    strategy: DistributionStrategy,
    state: ScheduleState,
}

impl Distributor {
    /// Create a distributor over integer weights
    pub fn new(weights: Vec<u64>, strategy: DistributionStrategy) -> Self {
        let state = ScheduleState::new(strategy, &weights);

        Self {
            weights,
            strategy,
            state,
        }
    }

    /// Create a distributor over real weights, scaling them to integers first
    pub fn from_real_weights(
        weights: &[f64],
        strategy: DistributionStrategy,
    ) -> Result<Self, ExperimentError> {
        Ok(Self::new(normalize_weights(weights)?, strategy))
    }

    /// Advance the schedule and return the next slot index
    pub fn next(&mut self) -> Result<usize, ExperimentError> {
        match &mut self.state {
            ScheduleState::Interleaved(state) => state.next(&self.weights),
            ScheduleState::Smooth(state) => state.next(&self.weights),
        }
    }

    /// Rewind to the state before the first call
    pub fn reset(&mut self) {
        self.state = ScheduleState::new(self.strategy, &self.weights);
    }

    /// Get the integer weights driving the schedule
    pub fn weights(&self) -> &[u64] {
        &self.weights
    }

    /// Get the scheduling strategy
    pub fn strategy(&self) -> DistributionStrategy {
        self.strategy
    }

    /// Number of calls after which every slot has been returned exactly
    /// in proportion to its weight
    pub fn lap_len(&self) -> u64 {
        let step = self
            .weights
            .iter()
            .copied()
            .filter(|w| *w > 0)
            .fold(0, gcd);

        if step == 0 {
            return 0;
        }

        self.weights.iter().map(|w| w / step).sum()
    }

    /// Check whether no slot can ever be returned
    pub fn is_exhausted(&self) -> bool {
        self.weights.iter().all(|w| *w == 0)
    }
}
