//! In-memory catalog of live experiments keyed by ID

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::experiment::{Context, Experiment, ExperimentDefinition, ExperimentId};
use crate::domain::ExperimentError;

/// Errors raised by catalog operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Experiment '{id}' is invalid: {source}")]
    InvalidDefinition {
        id: String,
        #[source]
        source: ExperimentError,
    },

    #[error("Experiment '{0}' already exists")]
    Conflict(String),

    #[error("Experiment '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Experiment(#[from] ExperimentError),
}

/// Shared experiment handle stored in the catalog
pub type SharedExperiment = Arc<Experiment<Value>>;

/// In-memory experiment catalog implementation
///
/// Each registered experiment keeps its own pick schedule for the lifetime
/// of the catalog.
#[derive(Debug, Default)]
pub struct InMemoryExperimentCatalog {
    experiments: RwLock<HashMap<ExperimentId, SharedExperiment>>,
}

impl InMemoryExperimentCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every definition and register it under its ID
    pub fn from_definitions(
        definitions: &BTreeMap<String, ExperimentDefinition>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self::new();

        for (id, definition) in definitions {
            let invalid = |source| CatalogError::InvalidDefinition {
                id: id.clone(),
                source,
            };
            let experiment_id = ExperimentId::new(id.as_str()).map_err(invalid)?;
            let experiment = definition.build().map_err(invalid)?;
            catalog.register(experiment_id, experiment)?;
        }

        info!(experiments = catalog.len(), "Experiment catalog loaded");
        Ok(catalog)
    }

    /// Register an experiment, failing if the ID is taken
    pub fn register(
        &self,
        id: ExperimentId,
        experiment: Experiment<Value>,
    ) -> Result<SharedExperiment, CatalogError> {
        let mut experiments = self
            .experiments
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if experiments.contains_key(&id) {
            return Err(CatalogError::Conflict(id.to_string()));
        }

        debug!(experiment_id = %id, variations = experiment.len(), "Registering experiment");
        let shared = Arc::new(experiment);
        experiments.insert(id, Arc::clone(&shared));
        Ok(shared)
    }

    /// Get an experiment by ID
    pub fn get(&self, id: &str) -> Option<SharedExperiment> {
        let experiments = self
            .experiments
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        experiments.get(id).cloned()
    }

    /// Remove an experiment, returning whether it existed
    pub fn remove(&self, id: &str) -> bool {
        let mut experiments = self
            .experiments
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        experiments.remove(id).is_some()
    }

    /// All registered IDs in sorted order
    pub fn ids(&self) -> Vec<ExperimentId> {
        let experiments = self
            .experiments
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let mut ids: Vec<_> = experiments.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Pick from the experiment registered under `id`
    pub fn pick_for(&self, id: &str, context: &Context) -> Result<Option<Value>, CatalogError> {
        let experiment = self
            .get(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        Ok(experiment.pick_for(context)?.cloned())
    }

    pub fn len(&self) -> usize {
        self.experiments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
