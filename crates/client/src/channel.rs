//! Message channel
//!
//! `Channel` is the publisher's view of the transport: publish one payload on
//! a topic and wait for the listener's acknowledgment.
//!
//! `TcpChannel` speaks the length-prefixed frame protocol from
//! `roadpulse_protocol::frame`. Each publish writes one `Publish` frame and
//! then reads exactly one `Ack` frame, so at most one sample is in flight per
//! connection.
//!
//! A timeout or I/O failure leaves the stream in an unknown position (a late
//! ack could still arrive), so the connection is dropped and re-opened lazily
//! on the next publish.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

use roadpulse_protocol::{
    AckStatus, ChannelFrame, LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE, ProtocolError, read_length_prefix,
};

use crate::error::{ChannelError, Result};

/// Transport used by the publisher
#[async_trait]
pub trait Channel: Send {
    /// Publish one payload and wait for its acknowledgment
    async fn publish(&mut self, topic: &str, payload: Bytes) -> Result<()>;

    /// Close the channel; further publishes fail with `Closed`
    async fn close(&mut self) -> Result<()>;
}

/// Message channel over a TCP connection to the channel listener
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use roadpulse_client::{Channel, TcpChannel};
///
/// let mut channel = TcpChannel::connect("127.0.0.1:1883", Duration::from_secs(5)).await?;
/// channel.publish("agent_data/1", payload).await?;
/// channel.close().await?;
/// ```
#[derive(Debug)]
pub struct TcpChannel {
    addr: String,
    ack_timeout: Duration,
    stream: Option<TcpStream>,
    closed: bool,
}

impl TcpChannel {
    /// Connect to a channel listener
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::Connect` if the connection cannot be opened.
    pub async fn connect(addr: impl Into<String>, ack_timeout: Duration) -> Result<Self> {
        let addr = addr.into();
        let stream = open(&addr).await?;
        info!(addr = %addr, "connected to channel");

        Ok(Self {
            addr,
            ack_timeout,
            stream: Some(stream),
            closed: false,
        })
    }

    /// Listener address
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Whether a connection is currently open
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

#[async_trait]
impl Channel for TcpChannel {
    async fn publish(&mut self, topic: &str, payload: Bytes) -> Result<()> {
        if self.closed {
            return Err(ChannelError::Closed);
        }

        let frame = ChannelFrame::Publish {
            topic: topic.to_string(),
            payload,
        }
        .encode();

        let body_len = frame.len() - LENGTH_PREFIX_SIZE;
        if body_len > MAX_FRAME_SIZE as usize {
            return Err(ProtocolError::FrameTooLarge {
                size: body_len,
                max: MAX_FRAME_SIZE as usize,
            }
            .into());
        }

        if self.stream.is_none() {
            let stream = open(&self.addr).await?;
            info!(addr = %self.addr, "reconnected to channel");
            self.stream = Some(stream);
        }
        let Some(stream) = self.stream.as_mut() else {
            return Err(ChannelError::Closed);
        };

        match exchange(stream, &frame, self.ack_timeout).await {
            Ok(status) if status.is_success() => Ok(()),
            Ok(status) => Err(ChannelError::Rejected { status }),
            Err(e) => {
                if e.breaks_connection() {
                    debug!(addr = %self.addr, error = %e, "dropping channel connection");
                    self.stream = None;
                }
                Err(e)
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        if let Some(mut stream) = self.stream.take() {
            stream.shutdown().await?;
            debug!(addr = %self.addr, "channel closed");
        }
        Ok(())
    }
}

async fn open(addr: &str) -> Result<TcpStream> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|e| ChannelError::connect(addr, e))?;
    stream.set_nodelay(true)?;
    Ok(stream)
}

/// Write one frame and wait for the matching ack
async fn exchange(stream: &mut TcpStream, frame: &[u8], ack_timeout: Duration) -> Result<AckStatus> {
    stream.write_all(frame).await?;

    let reply = tokio::time::timeout(ack_timeout, read_frame(stream))
        .await
        .map_err(|_| ChannelError::Timeout(ack_timeout))??;

    match reply {
        ChannelFrame::Ack(status) => Ok(status),
        ChannelFrame::Publish { .. } => {
            Err(ProtocolError::invalid_frame("expected ack, received publish").into())
        }
    }
}

/// Read one length-prefixed frame
async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<ChannelFrame> {
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    reader.read_exact(&mut prefix).await?;
    let len = read_length_prefix(&prefix)?;

    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await?;

    Ok(ChannelFrame::decode(Bytes::from(body))?)
}
