//! Application-wide error types.

use thiserror::Error;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Site, form, row or snapshot not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A field failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule violation (e.g. deleting the default site).
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Persistence collaborator failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code surfaced to the host UI.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the error should be shown next to a form field
    /// rather than as a general failure.
    #[must_use]
    pub const fn is_field_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
