//! Message channel frames
//!
//! The publisher and the ingestion server talk over a plain TCP stream using
//! a length-prefixed binary format.
//!
//! # Wire Format
//!
//! ```text
//! ┌──────────────┬──────────┬─────────────────────────────┐
//! │ 4 bytes      │ 1 byte   │ N bytes                     │
//! │ length (BE)  │ type     │ body                        │
//! └──────────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! The length covers the type byte and the body.
//!
//! # Frame Types
//!
//! - `Publish` (0x01): Publisher → Server, `[u32 topic len][topic][u32 payload len][payload]`
//! - `Ack` (0x02): Server → Publisher, `[u8 status]`

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::ProtocolError;
use crate::{LENGTH_PREFIX_SIZE, Result};

/// Frame type discriminants
const FRAME_PUBLISH: u8 = 0x01;
const FRAME_ACK: u8 = 0x02;

/// Maximum frame size (1MB)
pub const MAX_FRAME_SIZE: u32 = 1024 * 1024;

/// Acknowledgment status returned for each publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AckStatus {
    /// Sample persisted
    Accepted = 0,
    /// Sample failed validation
    Rejected = 1,
    /// Store failed to persist the sample
    StoreFailed = 2,
    /// Frame could not be understood
    ProtocolError = 3,
}

impl AckStatus {
    /// Whether the publish succeeded
    #[inline]
    pub fn is_success(self) -> bool {
        self == Self::Accepted
    }

    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Convert from the wire value
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Accepted),
            1 => Ok(Self::Rejected),
            2 => Ok(Self::StoreFailed),
            3 => Ok(Self::ProtocolError),
            other => Err(ProtocolError::invalid_frame(format!(
                "unknown ack status: {other}"
            ))),
        }
    }
}

/// Frames exchanged over the message channel
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelFrame {
    /// Publisher → Server: one encoded sample on a topic
    Publish { topic: String, payload: Bytes },
    /// Server → Publisher: outcome of the preceding publish
    Ack(AckStatus),
}

impl ChannelFrame {
    /// Encode frame to bytes with length prefix
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + 64);

        // Reserve space for length prefix (filled in at end)
        buf.put_u32(0);

        match self {
            ChannelFrame::Publish { topic, payload } => {
                buf.put_u8(FRAME_PUBLISH);
                encode_bytes(topic.as_bytes(), &mut buf);
                encode_bytes(payload, &mut buf);
            }
            ChannelFrame::Ack(status) => {
                buf.put_u8(FRAME_ACK);
                buf.put_u8(status.to_u8());
            }
        }

        let len = (buf.len() - LENGTH_PREFIX_SIZE) as u32;
        buf[0..LENGTH_PREFIX_SIZE].copy_from_slice(&len.to_be_bytes());

        buf.freeze()
    }

    /// Decode a frame body (without length prefix)
    pub fn decode(mut buf: Bytes) -> Result<Self> {
        if buf.is_empty() {
            return Err(ProtocolError::too_short(1, 0));
        }

        match buf.get_u8() {
            FRAME_PUBLISH => {
                let topic = decode_bytes(&mut buf)?;
                let topic = String::from_utf8(topic.to_vec())
                    .map_err(|e| ProtocolError::invalid_frame(format!("invalid UTF-8 topic: {e}")))?;
                let payload = decode_bytes(&mut buf)?;
                Ok(ChannelFrame::Publish { topic, payload })
            }
            FRAME_ACK => {
                if buf.remaining() < 1 {
                    return Err(ProtocolError::too_short(1, 0));
                }
                Ok(ChannelFrame::Ack(AckStatus::from_u8(buf.get_u8())?))
            }
            other => Err(ProtocolError::UnknownFrameType(other)),
        }
    }
}

fn encode_bytes(data: &[u8], buf: &mut BytesMut) {
    buf.put_u32(data.len() as u32);
    buf.put_slice(data);
}

fn decode_bytes(buf: &mut Bytes) -> Result<Bytes> {
    if buf.remaining() < 4 {
        return Err(ProtocolError::too_short(4, buf.remaining()));
    }
    let len = buf.get_u32() as usize;
    if buf.remaining() < len {
        return Err(ProtocolError::too_short(len, buf.remaining()));
    }
    Ok(buf.split_to(len))
}

/// Read a frame length prefix, rejecting empty and oversized frames
pub fn read_length_prefix(buf: &[u8]) -> Result<u32> {
    if buf.len() < LENGTH_PREFIX_SIZE {
        return Err(ProtocolError::too_short(LENGTH_PREFIX_SIZE, buf.len()));
    }
    let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if len == 0 {
        return Err(ProtocolError::invalid_frame("zero-length frame"));
    }
    if len > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge {
            size: len as usize,
            max: MAX_FRAME_SIZE as usize,
        });
    }
    Ok(len)
}
