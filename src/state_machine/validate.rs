//! Submission validation

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Error! Please ask a question.")]
    Empty,
}

/// Trim a submission, rejecting it if nothing is left
pub fn validate(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    Ok(trimmed.to_string())
}
