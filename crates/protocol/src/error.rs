//! Protocol error types
//!
//! Errors that can occur when encoding or decoding samples and channel frames.

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// JSON encoding or decoding failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Timestamp is not ISO 8601
    #[error("invalid timestamp format '{value}'. Expected ISO 8601 format (YYYY-MM-DDTHH:MM:SSZ)")]
    InvalidTimestamp { value: String },

    /// Frame is too short to contain required fields
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort { expected: usize, actual: usize },

    /// Frame exceeds the maximum size
    #[error("frame size {size} exceeds maximum {max}")]
    FrameTooLarge { size: usize, max: usize },

    /// Unknown frame type discriminant
    #[error("unknown frame type: {0:#04x}")]
    UnknownFrameType(u8),

    /// Frame carries an invalid value
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

impl ProtocolError {
    /// Create an invalid timestamp error
    #[inline]
    pub fn invalid_timestamp(value: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
        }
    }

    /// Create a frame too short error
    #[inline]
    pub fn too_short(expected: usize, actual: usize) -> Self {
        Self::FrameTooShort { expected, actual }
    }

    /// Create an invalid frame error
    #[inline]
    pub fn invalid_frame(msg: impl Into<String>) -> Self {
        Self::InvalidFrame(msg.into())
    }
}
