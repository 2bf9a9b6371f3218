// Field-level validation errors
//
// Validation failures are recovered locally: the caller re-renders the form
// with the message next to the offending field and no state changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A validation failure attached to a single form field
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[error("{field}: {message}")]
pub struct FieldError {
    /// Name of the form field that failed validation
    pub field: String,
    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Return the trimmed value, or a "required" error for blank input.
pub fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(FieldError::new(field, format!("{} is required", field)))
    } else {
        Ok(trimmed)
    }
}
