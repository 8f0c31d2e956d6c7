//! Session error types.

use caisse_shared::AppError;
use thiserror::Error;

use crate::ledger::{FieldError, LedgerError};
use crate::storage::StorageError;

/// Errors that can occur while driving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No site at the given index.
    #[error("Site not found at index {0}")]
    SiteNotFound(usize),

    /// No form at the given index in the current site.
    #[error("Form not found at index {0}")]
    FormNotFound(usize),

    /// No history snapshot at the given index in the current form.
    #[error("History snapshot not found at index {0}")]
    SnapshotNotFound(usize),

    /// The first site cannot be deleted.
    #[error("Cannot delete the default site")]
    DefaultSiteProtected,

    /// Site names cannot be blank.
    #[error("Site name cannot be empty")]
    EmptySiteName,

    /// Configuration holds an unusable value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A balance field failed validation.
    #[error(transparent)]
    Validation(#[from] FieldError),

    /// Row addressing failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SiteNotFound(_) => "SITE_NOT_FOUND",
            Self::FormNotFound(_) => "FORM_NOT_FOUND",
            Self::SnapshotNotFound(_) => "SNAPSHOT_NOT_FOUND",
            Self::DefaultSiteProtected => "DEFAULT_SITE_PROTECTED",
            Self::EmptySiteName => "EMPTY_SITE_NAME",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Validation(err) => err.source.error_code(),
            Self::Ledger(err) => err.error_code(),
            Self::Storage(err) => err.error_code(),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::SiteNotFound(_)
            | SessionError::FormNotFound(_)
            | SessionError::SnapshotNotFound(_)
            | SessionError::Ledger(_) => Self::NotFound(err.to_string()),
            SessionError::Validation(_) | SessionError::EmptySiteName => {
                Self::Validation(err.to_string())
            }
            SessionError::DefaultSiteProtected => Self::BusinessRule(err.to_string()),
            SessionError::Storage(_) => Self::Storage(err.to_string()),
            SessionError::InvalidConfig(_) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{BalanceField, ValidationError};

    #[test]
    fn test_conversion_to_app_error() {
        let app: AppError = SessionError::DefaultSiteProtected.into();
        assert_eq!(app.error_code(), "BUSINESS_RULE_VIOLATION");

        let app: AppError = SessionError::FormNotFound(4).into();
        assert_eq!(app.error_code(), "NOT_FOUND");

        let field = FieldError {
            field: BalanceField::SoldeDeDebut,
            source: ValidationError::MissingOrInvalid,
        };
        let app: AppError = SessionError::from(field).into();
        assert!(app.is_field_error());
        assert_eq!(
            app.to_string(),
            "Validation error: soldeDeDebut: svp insérer un solde de début"
        );
    }

    #[test]
    fn test_error_codes_follow_source() {
        let err = SessionError::from(FieldError {
            field: BalanceField::Fond,
            source: ValidationError::InvalidNumber,
        });
        assert_eq!(err.error_code(), "INVALID_NUMBER");
        assert_eq!(SessionError::SiteNotFound(2).error_code(), "SITE_NOT_FOUND");
    }
}
