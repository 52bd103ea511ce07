use thiserror::Error;

/// Errors raised while building or picking from an experiment
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExperimentError {
    #[error("Invalid targeting: {message}")]
    InvalidTargeting { message: String },

    #[error("Invalid weight: {message}")]
    InvalidWeight { message: String },

    #[error("Experiment must have at least one variation")]
    EmptyVariations,

    #[error("All variation weights are zero, nothing can be picked")]
    ExhaustedDistributor,

    #[error("Invalid experiment ID: {message}")]
    InvalidId { message: String },
}

impl ExperimentError {
    pub fn invalid_targeting(message: impl Into<String>) -> Self {
        Self::InvalidTargeting {
            message: message.into(),
        }
    }

    pub fn invalid_weight(message: impl Into<String>) -> Self {
        Self::InvalidWeight {
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }
}
