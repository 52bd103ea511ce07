//! Experiment validation utilities

use crate::domain::ExperimentError;

/// Maximum length for experiment IDs
pub const MAX_EXPERIMENT_ID_LENGTH: usize = 50;

/// Validate an experiment ID
///
/// IDs are ASCII alphanumerics separated by single hyphens, and must start
/// and end with an alphanumeric character.
pub fn validate_experiment_id(id: &str) -> Result<(), ExperimentError> {
    let (Some(first_char), Some(last_char)) = (id.chars().next(), id.chars().last()) else {
        return Err(ExperimentError::invalid_id("ID cannot be empty"));
    };

    if id.len() > MAX_EXPERIMENT_ID_LENGTH {
        return Err(ExperimentError::invalid_id(format!(
            "ID exceeds maximum length of {} characters",
            MAX_EXPERIMENT_ID_LENGTH
        )));
    }

    if !first_char.is_ascii_alphanumeric() {
        return Err(ExperimentError::invalid_id(
            "ID must start with a letter or number",
        ));
    }

    if !last_char.is_ascii_alphanumeric() {
        return Err(ExperimentError::invalid_id(
            "ID must end with a letter or number",
        ));
    }

    let mut prev_was_hyphen = false;

    for ch in id.chars() {
        if ch == '-' {
            if prev_was_hyphen {
                return Err(ExperimentError::invalid_id(
                    "ID cannot contain consecutive hyphens",
                ));
            }
            prev_was_hyphen = true;
        } else if ch.is_ascii_alphanumeric() {
            prev_was_hyphen = false;
        } else {
            return Err(ExperimentError::invalid_id(format!(
                "ID contains invalid character: '{}'",
                ch
            )));
        }
    }

    Ok(())
}

/// Validate a variation weight
///
/// Zero is accepted and parks the variation; it will never be picked.
pub fn validate_weight(weight: f64) -> Result<f64, ExperimentError> {
    if !weight.is_finite() {
        return Err(ExperimentError::invalid_weight(format!(
            "weight must be a finite number, got {}",
            weight
        )));
    }

    if weight < 0.0 {
        return Err(ExperimentError::invalid_weight(format!(
            "weight cannot be negative, got {}",
            weight
        )));
    }

    Ok(weight)
}
