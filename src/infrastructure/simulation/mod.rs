//! Simulation harness
//!
//! Replays a stream of visitor contexts through an experiment and tallies
//! what was picked. Useful for checking a configuration's traffic split
//! before shipping it.

mod tally;
mod traffic;

pub use tally::Tally;
pub use traffic::{RoundRobinTraffic, TrafficSource};

#[cfg(test)]
pub use traffic::MockTrafficSource;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::experiment::Experiment;
use crate::domain::ExperimentError;

/// Picks observed for one variation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationCount {
    pub variation: String,
    pub count: u64,
    /// Fraction of all simulated picks
    pub share: f64,
}

/// Outcome of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub size: u64,
    /// Picks where targeting excluded the visitor
    pub unassigned: u64,
    /// Per-variation counts in first-picked order
    pub counts: Vec<VariationCount>,
}

impl SimulationReport {
    fn from_tally(tally: &Tally) -> Self {
        let size = tally.total();
        let share = |count: u64| {
            if size == 0 {
                0.0
            } else {
                count as f64 / size as f64
            }
        };

        Self {
            size,
            unassigned: tally.unassigned(),
            counts: tally
                .entries()
                .iter()
                .map(|(variation, count)| VariationCount {
                    variation: variation.clone(),
                    count: *count,
                    share: share(*count),
                })
                .collect(),
        }
    }

    /// Get the count for a variation key, zero if never picked
    pub fn count_of(&self, variation: &str) -> u64 {
        self.counts
            .iter()
            .find(|c| c.variation == variation)
            .map_or(0, |c| c.count)
    }
}

/// Key used to tally a JSON payload: its compact JSON text, so `"1"` and `1`
/// are counted apart
pub fn value_key(value: &Value) -> String {
    value.to_string()
}

/// Drives an experiment with traffic from a [`TrafficSource`]
#[derive(Debug)]
pub struct Simulator<S: TrafficSource> {
    traffic: S,
}

impl<S: TrafficSource> Simulator<S> {
    pub fn new(traffic: S) -> Self {
        Self { traffic }
    }

    /// Run `size` picks against a JSON-valued experiment
    pub fn run(
        &mut self,
        experiment: &Experiment<Value>,
        size: u64,
    ) -> Result<SimulationReport, ExperimentError> {
        self.run_with(experiment, size, value_key)
    }

    /// Run `size` picks, tallying each picked value under `key(value)`
    pub fn run_with<T>(
        &mut self,
        experiment: &Experiment<T>,
        size: u64,
        key: impl Fn(&T) -> String,
    ) -> Result<SimulationReport, ExperimentError> {
        let mut tally = Tally::new();

        for _ in 0..size {
            let context = self.traffic.next_context();

            match experiment.pick_for(&context)? {
                Some(value) => tally.count(key(value)),
                None => tally.count_unassigned(),
            }
        }

        let report = SimulationReport::from_tally(&tally);
        debug!(?report, "Simulation report");
        info!(
            size = report.size,
            unassigned = report.unassigned,
            variations = report.counts.len(),
            "Simulation complete"
        );

        Ok(report)
    }

    pub fn into_traffic(self) -> S {
        self.traffic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::experiment::{Context, ExperimentInput};
    use serde_json::json;

    fn buy_traffic() -> RoundRobinTraffic {
        RoundRobinTraffic::new(vec![
            Context::new().with("geo", "US").with("page", "buy"),
            Context::new().with("geo", "MX").with("page", "buy"),
            Context::new().with("geo", "IL").with("page", "about"),
            Context::new().with("page", "index"),
        ])
    }

    #[test]
    fn test_even_weights_report() {
        let experiment = Experiment::from_values([json!(1), json!(2), json!(3)]).unwrap();
        let report = Simulator::new(buy_traffic()).run(&experiment, 100).unwrap();

        assert_eq!(report.size, 100);
        assert_eq!(report.unassigned, 0);
        assert_eq!(report.count_of("1"), 34);
        assert_eq!(report.count_of("2"), 33);
        assert_eq!(report.count_of("3"), 33);
        assert_eq!(report.counts[0].share, 0.34);
    }

    #[test]
    fn test_targeted_experiment_report() {
        let experiment = ExperimentInput::new()
            .with_value(json!("red"))
            .with_value(json!("green"))
            .with_targeting([("page", "buy")])
            .build()
            .unwrap();

        let report = Simulator::new(buy_traffic()).run(&experiment, 100).unwrap();

        assert_eq!(report.unassigned, 50);
        assert_eq!(report.count_of(r#""red""#), 25);
        assert_eq!(report.count_of(r#""green""#), 25);
    }

    #[test]
    fn test_uses_traffic_source_per_pick() {
        let mut traffic = MockTrafficSource::new();
        traffic
            .expect_next_context()
            .times(10)
            .returning(|| Context::new().with("geo", "US"));

        let experiment = ExperimentInput::new()
            .with_value(json!("a"))
            .with_targeting([("geo", "US")])
            .build()
            .unwrap();

        let report = Simulator::new(traffic).run(&experiment, 10).unwrap();
        assert_eq!(report.count_of(r#""a""#), 10);
    }

    #[test]
    fn test_run_with_custom_key() {
        let experiment = Experiment::from_values([1, 2]).unwrap();
        let report = Simulator::new(RoundRobinTraffic::default())
            .run_with(&experiment, 4, |v| format!("v{}", v))
            .unwrap();

        assert_eq!(report.count_of("v1"), 2);
        assert_eq!(report.count_of("v2"), 2);
    }

    #[test]
    fn test_exhausted_experiment_fails() {
        let experiment = ExperimentInput::new()
            .with_weighted(json!("a"), 0.0)
            .build()
            .unwrap();

        let result = Simulator::new(RoundRobinTraffic::default()).run(&experiment, 3);
        assert_eq!(result, Err(ExperimentError::ExhaustedDistributor));
    }

    #[test]
    fn test_report_serialization() {
        let experiment = Experiment::from_values([json!("a")]).unwrap();
        let report = Simulator::new(RoundRobinTraffic::default())
            .run(&experiment, 2)
            .unwrap();

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "size": 2,
                "unassigned": 0,
                "counts": [{"variation": "\"a\"", "count": 2, "share": 1.0}]
            })
        );
    }

    #[test]
    fn test_string_and_number_counted_apart() {
        let experiment = Experiment::from_values([json!("1"), json!(1)]).unwrap();
        let report = Simulator::new(RoundRobinTraffic::default())
            .run(&experiment, 4)
            .unwrap();

        assert_eq!(report.counts.len(), 2);
        assert_eq!(report.count_of(r#""1""#), 2);
        assert_eq!(report.count_of("1"), 2);
    }

    #[test]
    fn test_value_key() {
        assert_eq!(value_key(&json!("red")), r#""red""#);
        assert_eq!(value_key(&json!(3)), "3");
        assert_eq!(value_key(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
