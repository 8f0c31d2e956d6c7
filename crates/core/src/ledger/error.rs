//! Ledger error types.

use thiserror::Error;

use super::types::RowKind;

/// Errors that can occur while editing a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The addressed row does not exist.
    #[error("No {kind} row at index {index}")]
    RowNotFound {
        /// Ledger the row was looked up in.
        kind: RowKind,
        /// Requested index.
        index: usize,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::RowNotFound { .. } => "ROW_NOT_FOUND",
        }
    }
}
