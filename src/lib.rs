//! Variation Picker
//!
//! Deterministic weighted selection of experiment variations with:
//! - Weighted round-robin distribution (interleaved or smooth)
//! - Targeting criteria matched against a visitor context
//! - Nested experiments as variation payloads
//! - Config-driven experiment catalogs and traffic simulation

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    Context, DistributionStrategy, Distributor, Experiment, ExperimentDefinition, ExperimentError,
    ExperimentId, ExperimentInput, Payload, Targeting, TargetingInput, Variation, VariationInput,
};
pub use infrastructure::experiment::{CatalogError, InMemoryExperimentCatalog};
pub use infrastructure::simulation::{RoundRobinTraffic, SimulationReport, Simulator, TrafficSource};
