//! Experiment domain entities

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

use super::distributor::{DistributionStrategy, Distributor};
use super::targeting::{Context, Targeting, TargetingInput};
use super::validation::validate_experiment_id;
use super::variation::{Payload, Variation, VariationInput};
use crate::domain::ExperimentError;

// ============================================================================
// ExperimentId
// ============================================================================

/// Unique identifier for an experiment in a catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExperimentId(String);

impl ExperimentId {
    /// Create a new experiment ID with validation
    pub fn new(id: impl Into<String>) -> Result<Self, ExperimentError> {
        let id = id.into();
        validate_experiment_id(&id)?;
        Ok(Self(id))
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ExperimentId {
    type Error = ExperimentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExperimentId> for String {
    fn from(id: ExperimentId) -> Self {
        id.0
    }
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ExperimentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ExperimentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// ExperimentInput
// ============================================================================

/// Everything needed to create an [`Experiment`]
#[derive(Debug)]
pub struct ExperimentInput<T> {
    pub variations: Vec<VariationInput<T>>,
    pub targeting: Option<TargetingInput>,
    pub strategy: DistributionStrategy,
}

impl<T> Default for ExperimentInput<T> {
    fn default() -> Self {
        Self {
            variations: Vec::new(),
            targeting: None,
            strategy: DistributionStrategy::default(),
        }
    }
}

impl<T> ExperimentInput<T> {
    /// Create an empty input
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variation in any short form
    pub fn with_variation(mut self, variation: impl Into<VariationInput<T>>) -> Self {
        self.variations.push(variation.into());
        self
    }

    /// Add a bare value with the default weight
    pub fn with_value(mut self, value: T) -> Self {
        self.variations.push(VariationInput::Value(value));
        self
    }

    /// Add a value with an explicit weight
    pub fn with_weighted(mut self, value: T, weight: f64) -> Self {
        self.variations.push(VariationInput::weighted(value, weight));
        self
    }

    /// Gate the experiment on targeting criteria
    pub fn with_targeting(mut self, targeting: impl Into<TargetingInput>) -> Self {
        self.targeting = Some(targeting.into());
        self
    }

    /// Set the scheduling strategy
    pub fn with_strategy(mut self, strategy: DistributionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Build the experiment
    pub fn build(self) -> Result<Experiment<T>, ExperimentError> {
        Experiment::create(self)
    }
}

// ============================================================================
// Experiment
// ============================================================================

/// A weighted set of variations, optionally gated by targeting
///
/// Every call to [`Experiment::pick_for`] advances a deterministic weighted
/// round-robin over the variations, so the same configuration always yields
/// the same pick sequence. The schedule sits behind a mutex: picks from
/// several threads are serialized, never interleaved.
///
/// The default [`DistributionStrategy::Interleaved`] schedule is exact only at
/// the end of each full lap; use [`DistributionStrategy::Smooth`] when every
/// prefix of picks must stay within one of its weighted share.
#[derive(Debug)]
pub struct Experiment<T> {
    variations: Vec<Variation<T>>,
    targeting: Option<Targeting>,
    distributor: Mutex<Distributor>,
}

impl<T> Experiment<T> {
    /// Create an experiment, normalizing every short-form input
    pub fn create(input: ExperimentInput<T>) -> Result<Self, ExperimentError> {
        if input.variations.is_empty() {
            return Err(ExperimentError::EmptyVariations);
        }

        let variations = input
            .variations
            .into_iter()
            .map(Variation::create)
            .collect::<Result<Vec<_>, _>>()?;
        let targeting = input.targeting.map(Targeting::create);

        let weights: Vec<f64> = variations.iter().map(Variation::weight).collect();
        let distributor = Distributor::from_real_weights(&weights, input.strategy)?;

        debug!(
            variations = variations.len(),
            strategy = %input.strategy,
            targeted = targeting.is_some(),
            "Experiment created"
        );

        Ok(Self {
            variations,
            targeting,
            distributor: Mutex::new(distributor),
        })
    }

    /// Create an untargeted experiment with evenly weighted values
    pub fn from_values(values: impl IntoIterator<Item = T>) -> Result<Self, ExperimentError> {
        Self::create(ExperimentInput {
            variations: values.into_iter().map(VariationInput::Value).collect(),
            ..ExperimentInput::default()
        })
    }

    // Getters

    /// Get all variations in declaration order
    pub fn variations(&self) -> &[Variation<T>] {
        &self.variations
    }

    /// Iterate the variations without touching the pick schedule
    pub fn iter(&self) -> std::slice::Iter<'_, Variation<T>> {
        self.variations.iter()
    }

    pub fn targeting(&self) -> Option<&Targeting> {
        self.targeting.as_ref()
    }

    pub fn strategy(&self) -> DistributionStrategy {
        self.lock_distributor().strategy()
    }

    pub fn len(&self) -> usize {
        self.variations.len()
    }

    /// Always false; experiments cannot be created empty
    pub fn is_empty(&self) -> bool {
        self.variations.is_empty()
    }

    /// Check whether this experiment is active for a context
    pub fn is_active_for(&self, context: &Context) -> bool {
        self.targeting
            .as_ref()
            .map_or(true, |targeting| targeting.matches(context))
    }

    // Picking

    /// Pick a value with an empty context
    pub fn pick(&self) -> Result<Option<&T>, ExperimentError> {
        self.pick_for(&Context::new())
    }

    /// Pick a value for a visitor context
    ///
    /// Returns `Ok(None)` when targeting excludes the context, either here or
    /// in the sub-experiment the pick was delegated to. A context excluded by
    /// this experiment's targeting leaves its schedule untouched.
    pub fn pick_for(&self, context: &Context) -> Result<Option<&T>, ExperimentError> {
        if !self.is_active_for(context) {
            debug!("Context does not match targeting, skipping experiment");
            return Ok(None);
        }

        let index = self.lock_distributor().next()?;
        trace!(index, "Variation picked");

        match self.variations[index].object() {
            Payload::Leaf(value) => Ok(Some(value)),
            Payload::Experiment(sub_experiment) => sub_experiment.pick_for(context),
        }
    }

    /// Rewind the pick schedule; sub-experiments keep their own state
    pub fn reset(&self) {
        self.lock_distributor().reset();
    }

    // Private helpers

    fn lock_distributor(&self) -> MutexGuard<'_, Distributor> {
        // next() never panics mid-update, so a poisoned state is still consistent
        self.distributor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<'a, T> IntoIterator for &'a Experiment<T> {
    type Item = &'a Variation<T>;
    type IntoIter = std::slice::Iter<'a, Variation<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.variations.iter()
    }
}

impl<T: Serialize> Serialize for Experiment<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let field_count = if self.targeting.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("Experiment", field_count)?;
        state.serialize_field("variations", &self.variations)?;

        if let Some(targeting) = &self.targeting {
            state.serialize_field("targeting", targeting)?;
        }

        state.serialize_field("strategy", &self.strategy())?;
        state.end()
    }
}
