//! Error taxonomy for controller configuration and per-call inputs

use thiserror::Error;

/// Errors surfaced by the controller.
///
/// A rejected call never mutates controller state.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PidError {
    /// A construction-time constraint was violated
    #[error("Invalid configuration for `{field}`: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    /// A call-time argument was rejected
    #[error("Invalid input for `{field}`: {value} {reason}")]
    InvalidInput {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl PidError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}

/// Pass a call-time value through if it is finite
pub(crate) fn finite_input(field: &'static str, value: f64) -> Result<f64, PidError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PidError::InvalidInput {
            field,
            value,
            reason: "is not a finite number",
        })
    }
}
