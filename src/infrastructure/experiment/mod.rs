//! Infrastructure layer for experiments
//!
//! Provides the in-memory experiment catalog.

mod in_memory_catalog;

pub use in_memory_catalog::{CatalogError, InMemoryExperimentCatalog, SharedExperiment};
