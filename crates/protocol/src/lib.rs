//! Roadpulse Protocol - core types that flow through the telemetry pipeline
//!
//! This crate provides the foundational types shared by the publisher and the
//! ingestion server:
//! - `AggregateSample` - one synchronized accelerometer + GPS reading
//! - `ProcessedAgentData` - an inbound sample tagged with agent and road state
//! - `PersistedRecord` - a stored sample with its server-assigned id
//! - `SourceId` - identifies one recorded sensor feed
//! - `ChannelFrame` - length-prefixed publish/ack frames for the message channel
//!
//! # Wire Format
//!
//! Samples travel as JSON documents with a fixed field layout:
//!
//! ```json
//! {
//!   "accelerometer": {"x": 1.0, "y": 2.0, "z": 3.0},
//!   "gps": {"longitude": 30.5, "latitude": 50.4},
//!   "timestamp": "2024-03-01T12:00:00.000000Z"
//! }
//! ```

mod codec;
mod error;
mod frame;
mod record;
mod sample;
mod source;
pub mod timestamp;

pub use codec::{decode_sample, encode_record, encode_sample};
pub use error::ProtocolError;
pub use frame::{AckStatus, ChannelFrame, MAX_FRAME_SIZE, read_length_prefix};
pub use record::{AgentData, AgentId, NewRecord, PersistedRecord, ProcessedAgentData};
pub use sample::{Accelerometer, AggregateSample, Gps};
pub use source::SourceId;

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Length prefix size for channel frames (4 bytes, big-endian u32)
pub const LENGTH_PREFIX_SIZE: usize = 4;

#[cfg(test)]
mod frame_test;
