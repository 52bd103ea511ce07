//! Experiment domain module for A/B testing
//!
//! An [`Experiment`] picks one of its weighted [`Variation`]s per call using a
//! deterministic weighted round-robin, optionally gated by [`Targeting`].
//! Variations may themselves be experiments, which is how mutually exclusive
//! sub-experiments are expressed.

mod definition;
mod distributor;
mod entity;
mod targeting;
mod validation;
mod variation;

// Re-export all public types
pub use definition::{ExperimentDefinition, PayloadDefinition, VariationDefinition};
pub use distributor::{normalize_weights, DistributionStrategy, Distributor};
pub use entity::{Experiment, ExperimentId, ExperimentInput};
pub use targeting::{Context, Targeting, TargetingInput};
pub use validation::{validate_experiment_id, validate_weight, MAX_EXPERIMENT_ID_LENGTH};
pub use variation::{Payload, Variation, VariationInput, DEFAULT_WEIGHT};
