//! Validation error taxonomy.
//!
//! These errors occur when request input doesn't meet requirements. They are
//! locally correctable by the caller and map to 400-class responses at the
//! gateway.

use thiserror::Error;

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A field is shorter than the allowed minimum.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// A field exceeds the allowed maximum length.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// A field doesn't match the expected format.
    #[error("{field} is invalid: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Required error.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
