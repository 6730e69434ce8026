//! Validation Error Types

use thiserror::Error;

/// Errors during record validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Field has the wrong scalar type
    #[error("{field} must be {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Categorical value outside the allowed set
    #[error("{field} value {value:?} is not one of {allowed:?}")]
    InvalidCategory {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    /// Value is not usable (NaN, infinite)
    #[error("{field} has an invalid value: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl ValidationError {
    /// Field the error refers to
    pub fn field(&self) -> &str {
        match self {
            ValidationError::TypeMismatch { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidCategory { field, .. }
            | ValidationError::InvalidValue { field, .. }
            | ValidationError::MissingField(field) => field,
        }
    }
}
