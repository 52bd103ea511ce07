//! Serializable short-form experiment definitions
//!
//! Definitions are what configuration files contain. Every variation may be
//! written as:
//! - a bare value: `"red"` (weight 1)
//! - an explicit record: `{ object = "blue", weight = 2 }`
//! - a nested experiment: `{ variations = [...], targeting = {...} }`
//!
//! Targeting is a plain key/value mapping.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::distributor::DistributionStrategy;
use super::entity::{Experiment, ExperimentInput};
use super::targeting::Targeting;
use super::variation::{Payload, VariationInput, DEFAULT_WEIGHT};
use crate::domain::ExperimentError;

/// Declarative description of an experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentDefinition {
    pub variations: Vec<VariationDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targeting: Option<Value>,
    #[serde(default)]
    pub strategy: DistributionStrategy,
}

/// One variation in any of its short forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariationDefinition {
    /// A nested experiment
    Experiment(ExperimentDefinition),
    /// An explicit payload with an optional weight
    Weighted {
        object: PayloadDefinition,
        /// `None` only when the field is absent; an explicit `null` is kept
        #[serde(
            default,
            deserialize_with = "deserialize_present",
            skip_serializing_if = "Option::is_none"
        )]
        weight: Option<Value>,
    },
    /// A bare value
    Value(Value),
}

/// The `object` of an explicit variation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadDefinition {
    Experiment(ExperimentDefinition),
    Value(Value),
}

impl ExperimentDefinition {
    /// Build a live experiment, recursively building nested definitions
    pub fn build(&self) -> Result<Experiment<Value>, ExperimentError> {
        let mut input = ExperimentInput::new().with_strategy(self.strategy);

        for variation in &self.variations {
            input = input.with_variation(variation.to_input()?);
        }

        if let Some(targeting) = &self.targeting {
            input = input.with_targeting(Targeting::from_value(targeting.clone())?);
        }

        input.build()
    }
}

impl VariationDefinition {
    fn to_input(&self) -> Result<VariationInput<Value>, ExperimentError> {
        match self {
            Self::Experiment(definition) => Ok(definition.build()?.into()),
            Self::Weighted { object, weight } => Ok(VariationInput::Weighted {
                object: object.to_payload()?,
                weight: parse_weight(weight.as_ref())?,
            }),
            Self::Value(value) => Ok(VariationInput::Value(value.clone())),
        }
    }
}

impl PayloadDefinition {
    fn to_payload(&self) -> Result<Payload<Value>, ExperimentError> {
        match self {
            Self::Experiment(definition) => Ok(Payload::experiment(definition.build()?)),
            Self::Value(value) => Ok(Payload::Leaf(value.clone())),
        }
    }
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn parse_weight(weight: Option<&Value>) -> Result<f64, ExperimentError> {
    match weight {
        None => Ok(DEFAULT_WEIGHT),
        Some(value) => value.as_f64().ok_or_else(|| {
            ExperimentError::invalid_weight(format!("weight must be a number, got {}", value))
        }),
    }
}
