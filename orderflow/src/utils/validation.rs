//! Required-field validation for operation inputs.

use crate::errors::ValidationError;

/// Validates that a required string input is present and non-blank.
pub fn require_field(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}
