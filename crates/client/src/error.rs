//! Error types for the message channel client

use std::io;
use std::time::Duration;

use thiserror::Error;

use roadpulse_protocol::{AckStatus, ProtocolError};

/// Result type for channel operations
pub type Result<T> = std::result::Result<T, ChannelError>;

/// Errors raised while publishing over the message channel
///
/// Apart from the initial `Connect`, none of these stop the publisher: the
/// failed sample is logged and dropped.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Could not open a connection to the channel listener
    #[error("failed to connect to {addr}: {error}")]
    Connect {
        addr: String,
        #[source]
        error: io::Error,
    },

    /// Read or write on an open connection failed
    #[error("channel I/O error: {0}")]
    Io(#[from] io::Error),

    /// Listener answered with a non-success acknowledgment
    #[error("publish rejected: {status:?}")]
    Rejected { status: AckStatus },

    /// No acknowledgment arrived in time
    #[error("no acknowledgment within {0:?}")]
    Timeout(Duration),

    /// Listener sent something that is not a valid frame
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Channel was closed locally
    #[error("channel is closed")]
    Closed,
}

impl ChannelError {
    /// Create a connect error
    pub fn connect(addr: impl Into<String>, error: io::Error) -> Self {
        Self::Connect {
            addr: addr.into(),
            error,
        }
    }

    /// Whether the connection must be re-established before the next publish
    pub fn breaks_connection(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Timeout(_) | Self::Protocol(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_rejected() {
        let err = ChannelError::Rejected {
            status: AckStatus::StoreFailed,
        };
        assert_eq!(err.to_string(), "publish rejected: StoreFailed");
    }

    #[test]
    fn test_error_display_timeout() {
        let err = ChannelError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "no acknowledgment within 250ms");
    }

    #[test]
    fn test_breaks_connection() {
        assert!(ChannelError::Timeout(Duration::from_secs(1)).breaks_connection());
        assert!(
            ChannelError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone")).breaks_connection()
        );
        assert!(
            !ChannelError::Rejected {
                status: AckStatus::Rejected
            }
            .breaks_connection()
        );
        assert!(!ChannelError::Closed.breaks_connection());
    }
}
