//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Key cannot be mapped to a storage location.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Reading or writing the backing medium failed.
    #[error("storage I/O failed for '{key}': {source}")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A value could not be encoded or decoded.
    #[error("storage serialization failed: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Create an I/O error for a key.
    #[must_use]
    pub fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            key: key.into(),
            source,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidKey(_) => "INVALID_STORAGE_KEY",
            Self::Io { .. } => "STORAGE_IO_ERROR",
            Self::Serialization(_) => "STORAGE_SERIALIZATION_ERROR",
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
