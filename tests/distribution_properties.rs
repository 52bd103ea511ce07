//! Property tests for the pick schedule.
//!
//! Uses proptest to verify:
//! 1. Every call lands on exactly one slot, and parked slots are never picked
//! 2. Interleaved schedules are exact at every lap boundary
//! 3. Smooth schedules stay within one pick of the ideal share at every prefix
//! 4. Reset replays the same sequence

use proptest::prelude::*;
use variation_picker::{DistributionStrategy, Distributor, Experiment, ExperimentInput};

const STEPS: usize = 200;

// ── Strategies (proptest) ────────────────────────────────────────────

/// Between one and six weights in 0..=20, at least one positive
fn arb_weights() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..=20, 1..=6)
        .prop_filter("at least one positive weight", |ws| ws.iter().any(|w| *w > 0))
}

fn arb_strategy() -> impl Strategy<Value = DistributionStrategy> {
    prop_oneof![
        Just(DistributionStrategy::Interleaved),
        Just(DistributionStrategy::Smooth),
    ]
}

fn run(weights: &[u64], strategy: DistributionStrategy, steps: usize) -> Vec<usize> {
    let mut distributor = Distributor::new(weights.to_vec(), strategy);
    (0..steps).map(|_| distributor.next().unwrap()).collect()
}

// ── 1. Coverage ──────────────────────────────────────────────────────

proptest! {
    /// Every index is in range and zero-weight slots never come up.
    #[test]
    fn picks_stay_on_positive_slots(weights in arb_weights(), strategy in arb_strategy()) {
        let picks = run(&weights, strategy, STEPS);

        prop_assert_eq!(picks.len(), STEPS);
        for index in picks {
            prop_assert!(index < weights.len());
            prop_assert!(weights[index] > 0);
        }
    }

    /// Every positive slot shows up within one lap.
    #[test]
    fn every_positive_slot_is_picked(weights in arb_weights(), strategy in arb_strategy()) {
        let lap = Distributor::new(weights.clone(), strategy).lap_len() as usize;
        let picks = run(&weights, strategy, lap);

        for (index, weight) in weights.iter().enumerate() {
            prop_assert_eq!(picks.contains(&index), *weight > 0);
        }
    }
}

// ── 2. Interleaved laps ──────────────────────────────────────────────

proptest! {
    /// After each full lap the counts equal the reduced weights times the lap number.
    #[test]
    fn interleaved_exact_at_lap_boundaries(weights in arb_weights()) {
        let strategy = DistributionStrategy::Interleaved;
        let lap = Distributor::new(weights.clone(), strategy).lap_len() as usize;
        let step = weights.iter().copied().filter(|w| *w > 0).fold(0, gcd);

        let mut counts = vec![0u64; weights.len()];
        for (k, index) in run(&weights, strategy, STEPS).into_iter().enumerate() {
            counts[index] += 1;

            let done = k + 1;
            if done % lap == 0 {
                let laps = (done / lap) as u64;
                for (count, weight) in counts.iter().zip(&weights) {
                    prop_assert_eq!(*count, weight / step * laps);
                }
            }
        }
    }
}

// ── 3. Smooth prefix bound ───────────────────────────────────────────

proptest! {
    /// At every prefix each count is within one of round(w * k / S).
    #[test]
    fn smooth_bounded_at_every_prefix(weights in arb_weights()) {
        let total: u64 = weights.iter().sum();
        let mut counts = vec![0i64; weights.len()];

        for (k, index) in run(&weights, DistributionStrategy::Smooth, STEPS).into_iter().enumerate() {
            counts[index] += 1;

            let done = (k + 1) as f64;
            prop_assert_eq!(counts.iter().sum::<i64>(), (k + 1) as i64);
            for (count, weight) in counts.iter().zip(&weights) {
                let ideal = (*weight as f64 * done / total as f64).round() as i64;
                prop_assert!(
                    (count - ideal).abs() <= 1,
                    "weights {:?}: count {} vs ideal {} after {} picks",
                    weights, count, ideal, k + 1
                );
            }
        }
    }
}

// ── 4. Determinism ───────────────────────────────────────────────────

proptest! {
    /// Two distributors with the same weights agree, and reset replays from the start.
    #[test]
    fn schedule_is_deterministic(weights in arb_weights(), strategy in arb_strategy()) {
        let mut distributor = Distributor::new(weights.clone(), strategy);
        let first: Vec<usize> = (0..50).map(|_| distributor.next().unwrap()).collect();

        distributor.reset();
        let replay: Vec<usize> = (0..50).map(|_| distributor.next().unwrap()).collect();

        prop_assert_eq!(&first, &replay);
        prop_assert_eq!(first, run(&weights, strategy, 50));
    }

    /// Experiments built from real-valued weights follow the same schedule
    /// as their integer equivalents.
    #[test]
    fn experiment_follows_distributor(weights in arb_weights(), strategy in arb_strategy()) {
        let input = weights
            .iter()
            .enumerate()
            .fold(ExperimentInput::new().with_strategy(strategy), |input, (i, w)| {
                input.with_weighted(i, *w as f64 / 4.0)
            });
        let experiment: Experiment<usize> = input.build().unwrap();

        let picks: Vec<usize> = (0..STEPS)
            .map(|_| *experiment.pick().unwrap().unwrap())
            .collect();

        prop_assert_eq!(picks, run(&weights, strategy, STEPS));
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}
