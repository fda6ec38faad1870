//! Store error types

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] turso::Error),

    /// Filesystem error while preparing the database location
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be mapped back to a record
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl StoreError {
    /// Create an invalid data error
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
