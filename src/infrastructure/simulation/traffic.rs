//! Visitor traffic sources for simulations

use crate::domain::experiment::Context;

#[cfg(test)]
use mockall::automock;

/// Supplies the visitor context for each simulated pick
#[cfg_attr(test, automock)]
pub trait TrafficSource {
    /// Produce the context for the next visitor
    fn next_context(&mut self) -> Context;
}

/// Cycles through a fixed list of contexts
///
/// An empty list yields empty contexts, which only untargeted experiments
/// will match.
#[derive(Debug, Clone, Default)]
pub struct RoundRobinTraffic {
    contexts: Vec<Context>,
    position: usize,
}

impl RoundRobinTraffic {
    pub fn new(contexts: Vec<Context>) -> Self {
        Self {
            contexts,
            position: 0,
        }
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }
}

impl TrafficSource for RoundRobinTraffic {
    fn next_context(&mut self) -> Context {
        if self.contexts.is_empty() {
            return Context::new();
        }

        let context = self.contexts[self.position].clone();
        self.position = (self.position + 1) % self.contexts.len();
        context
    }
}
