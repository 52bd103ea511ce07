//! Domain layer - experiments, targeting and the pick schedule

pub mod error;
pub mod experiment;

pub use error::ExperimentError;
pub use experiment::{
    Context, DistributionStrategy, Distributor, Experiment, ExperimentDefinition, ExperimentId,
    ExperimentInput, Payload, Targeting, TargetingInput, Variation, VariationInput,
};
