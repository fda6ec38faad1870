//! Pipeline error types

use std::io;

use thiserror::Error;

use roadpulse_store::StoreError;

/// Why one sample of a batch was not ingested
///
/// Neither variant aborts the batch; the remaining samples are still
/// processed.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Sample does not match the expected shape
    #[error("sample {index}: {message}")]
    Validation { index: usize, message: String },

    /// Sample was valid but could not be persisted
    #[error("sample {index}: {error}")]
    Store {
        index: usize,
        #[source]
        error: StoreError,
    },
}

impl IngestError {
    /// Create a validation error
    pub fn validation(index: usize, message: impl Into<String>) -> Self {
        Self::Validation {
            index,
            message: message.into(),
        }
    }

    /// Position of the sample in its batch
    pub fn index(&self) -> usize {
        match self {
            Self::Validation { index, .. } | Self::Store { index, .. } => *index,
        }
    }

    /// Description without the index prefix
    pub fn reason(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::Store { error, .. } => error.to_string(),
        }
    }
}

/// Channel listener errors
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Could not bind the listening socket
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// I/O error on a connection
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::validation(3, "missing field `road_state`");
        assert_eq!(err.to_string(), "sample 3: missing field `road_state`");
        assert_eq!(err.index(), 3);
        assert_eq!(err.reason(), "missing field `road_state`");

        let err = IngestError::Store {
            index: 1,
            error: StoreError::invalid("id", "not an integer"),
        };
        assert_eq!(err.index(), 1);
        assert!(err.to_string().contains("invalid id"));
    }
}
