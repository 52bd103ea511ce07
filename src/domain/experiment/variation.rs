//! Weighted variations and their payloads

use serde::{Serialize, Serializer};
use std::sync::Arc;

use super::entity::Experiment;
use super::validation::validate_weight;
use crate::domain::ExperimentError;

/// Weight given to variations declared without one
pub const DEFAULT_WEIGHT: f64 = 1.0;

// ============================================================================
// Payload
// ============================================================================

/// What a variation hands back when picked
#[derive(Debug)]
pub enum Payload<T> {
    /// A plain value returned to the caller
    Leaf(T),
    /// A sub-experiment the pick is delegated to
    Experiment(Arc<Experiment<T>>),
}

impl<T> Payload<T> {
    pub fn leaf(value: T) -> Self {
        Self::Leaf(value)
    }

    /// Wrap a sub-experiment; pass an `Arc` to share it between parents
    pub fn experiment(experiment: impl Into<Arc<Experiment<T>>>) -> Self {
        Self::Experiment(experiment.into())
    }

    /// Get the leaf value, if this is not a sub-experiment
    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            Self::Leaf(value) => Some(value),
            Self::Experiment(_) => None,
        }
    }

    /// Get the sub-experiment, if any
    pub fn as_experiment(&self) -> Option<&Arc<Experiment<T>>> {
        match self {
            Self::Leaf(_) => None,
            Self::Experiment(experiment) => Some(experiment),
        }
    }

    pub fn is_experiment(&self) -> bool {
        matches!(self, Self::Experiment(_))
    }
}

impl<T: Clone> Clone for Payload<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(value) => Self::Leaf(value.clone()),
            Self::Experiment(experiment) => Self::Experiment(Arc::clone(experiment)),
        }
    }
}

/// Sub-experiments compare by identity, leaves by value
impl<T: PartialEq> PartialEq for Payload<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Leaf(a), Self::Leaf(b)) => a == b,
            (Self::Experiment(a), Self::Experiment(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T: Serialize> Serialize for Payload<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Leaf(value) => value.serialize(serializer),
            Self::Experiment(experiment) => experiment.as_ref().serialize(serializer),
        }
    }
}

// ============================================================================
// Variation
// ============================================================================

/// Short-form input accepted by [`Variation::create`]
#[derive(Debug)]
pub enum VariationInput<T> {
    /// An already built variation, used as-is
    Variation(Variation<T>),
    /// A bare value, weighted [`DEFAULT_WEIGHT`]
    Value(T),
    /// An explicit payload and weight
    Weighted { object: Payload<T>, weight: f64 },
}

impl<T> VariationInput<T> {
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    pub fn weighted(value: T, weight: f64) -> Self {
        Self::Weighted {
            object: Payload::Leaf(value),
            weight,
        }
    }
}

impl<T> From<Variation<T>> for VariationInput<T> {
    fn from(variation: Variation<T>) -> Self {
        Self::Variation(variation)
    }
}

impl<T> From<Experiment<T>> for VariationInput<T> {
    fn from(experiment: Experiment<T>) -> Self {
        Self::Weighted {
            object: Payload::experiment(experiment),
            weight: DEFAULT_WEIGHT,
        }
    }
}

impl<T> From<Arc<Experiment<T>>> for VariationInput<T> {
    fn from(experiment: Arc<Experiment<T>>) -> Self {
        Self::Weighted {
            object: Payload::Experiment(experiment),
            weight: DEFAULT_WEIGHT,
        }
    }
}

/// One weighted candidate outcome of an experiment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variation<T> {
    object: Payload<T>,
    weight: f64,
}

impl<T> Variation<T> {
    /// Normalize a short-form input into a variation
    pub fn create(input: VariationInput<T>) -> Result<Self, ExperimentError> {
        match input {
            VariationInput::Variation(variation) => Ok(variation),
            VariationInput::Value(value) => Ok(Self::new(value)),
            VariationInput::Weighted { object, weight } => Ok(Self {
                object,
                weight: validate_weight(weight)?,
            }),
        }
    }

    /// Create a leaf variation with the default weight
    pub fn new(value: T) -> Self {
        Self {
            object: Payload::Leaf(value),
            weight: DEFAULT_WEIGHT,
        }
    }

    /// Create a leaf variation with an explicit weight
    pub fn weighted(value: T, weight: f64) -> Result<Self, ExperimentError> {
        Self::create(VariationInput::weighted(value, weight))
    }

    pub fn object(&self) -> &Payload<T> {
        &self.object
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// A parked variation has weight zero and is never picked
    pub fn is_parked(&self) -> bool {
        self.weight == 0.0
    }
}
