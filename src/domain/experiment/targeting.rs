//! Targeting criteria and the visitor context they are matched against

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::domain::ExperimentError;

// ============================================================================
// Context
// ============================================================================

/// Attributes describing the current visitor, e.g. `{geo: "US", page: "buy"}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(Map<String, Value>);

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get an attribute value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Context {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// ============================================================================
// Targeting
// ============================================================================

/// Short-form input accepted by [`Targeting::create`]
#[derive(Debug, Clone, PartialEq)]
pub enum TargetingInput {
    /// An already built targeting, used as-is
    Targeting(Targeting),
    /// Plain attribute expectations
    Criteria(BTreeMap<String, Value>),
}

impl From<Targeting> for TargetingInput {
    fn from(targeting: Targeting) -> Self {
        Self::Targeting(targeting)
    }
}

impl From<BTreeMap<String, Value>> for TargetingInput {
    fn from(criteria: BTreeMap<String, Value>) -> Self {
        Self::Criteria(criteria)
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for TargetingInput {
    fn from(pairs: [(K, V); N]) -> Self {
        Self::Criteria(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Attribute expectations that gate an experiment
///
/// A context matches when it carries every criteria key with an equal value.
/// Keys missing from the context never match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Targeting {
    criteria: BTreeMap<String, Value>,
}

impl Targeting {
    /// Normalize a short-form input into a targeting
    pub fn create(input: impl Into<TargetingInput>) -> Self {
        match input.into() {
            TargetingInput::Targeting(targeting) => targeting,
            TargetingInput::Criteria(criteria) => Self { criteria },
        }
    }

    /// Build a targeting from a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, ExperimentError> {
        match value {
            Value::Object(map) => Ok(Self {
                criteria: map.into_iter().collect(),
            }),
            other => Err(ExperimentError::invalid_targeting(format!(
                "expected a key/value mapping, got {}",
                other
            ))),
        }
    }

    /// Check whether `key` is expected to equal `value`
    pub fn has(&self, key: &str, value: impl Into<Value>) -> bool {
        self.criteria.get(key) == Some(&value.into())
    }

    /// Check whether a context satisfies every expectation
    pub fn matches(&self, context: &Context) -> bool {
        self.criteria
            .iter()
            .all(|(key, expected)| context.get(key) == Some(expected))
    }

    pub fn criteria(&self) -> &BTreeMap<String, Value> {
        &self.criteria
    }
}
