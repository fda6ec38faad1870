//! Message channel listener
//!
//! Accepts publisher connections and turns every `Publish` frame into one
//! ingested sample. The agent id is the last `/`-separated segment of the
//! topic (`agent_data/7` → agent 7); the road state is the configured
//! default.
//!
//! Each publish is persisted before its `Ack` is written, so an accepted
//! acknowledgment always means the record is in the store.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use roadpulse_protocol::{
    AckStatus, AgentId, ChannelFrame, LENGTH_PREFIX_SIZE, ProtocolError, decode_sample,
    read_length_prefix,
};

use crate::error::ListenerError;
use crate::ingest::IngestionService;

/// Default road state for samples that arrive over the channel
pub const DEFAULT_ROAD_STATE: &str = "unclassified";

/// Listener configuration
#[derive(Debug, Clone)]
pub struct ChannelListenerConfig {
    /// Address to bind
    pub address: String,
    /// Road state recorded for channel samples
    pub default_road_state: String,
}

impl Default for ChannelListenerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:1883".into(),
            default_road_state: DEFAULT_ROAD_STATE.into(),
        }
    }
}

/// TCP listener for publisher connections
pub struct ChannelListener {
    config: ChannelListenerConfig,
    service: Arc<IngestionService>,
}

impl ChannelListener {
    pub fn new(config: ChannelListenerConfig, service: Arc<IngestionService>) -> Self {
        Self { config, service }
    }

    /// Bind the configured address and serve until cancelled
    pub async fn run(self, cancel: CancellationToken) -> Result<(), ListenerError> {
        let listener = self.bind().await?;
        self.serve(listener, cancel).await
    }

    /// Bind the configured address
    pub async fn bind(&self) -> Result<TcpListener, ListenerError> {
        TcpListener::bind(&self.config.address)
            .await
            .map_err(|e| ListenerError::Bind {
                address: self.config.address.clone(),
                source: e,
            })
    }

    /// Serve an already-bound listener until cancelled
    pub async fn serve(self, listener: TcpListener, cancel: CancellationToken) -> Result<(), ListenerError> {
        info!(
            address = %listener.local_addr()?,
            road_state = %self.config.default_road_state,
            "channel listener started"
        );

        let listener_state = Arc::new(self);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            let state = Arc::clone(&listener_state);
                            let cancel = cancel.clone();
                            tokio::spawn(async move {
                                if let Err(e) = state.handle_connection(stream, peer_addr, cancel).await {
                                    debug!(peer = %peer_addr, error = %e, "channel connection ended");
                                }
                            });
                        }
                        Err(e) => {
                            warn!(error = %e, "accept error");
                        }
                    }
                }
            }
        }

        info!("channel listener stopped");
        Ok(())
    }

    async fn handle_connection(
        &self,
        mut stream: TcpStream,
        peer_addr: SocketAddr,
        cancel: CancellationToken,
    ) -> Result<(), ListenerError> {
        stream.set_nodelay(true)?;
        debug!(peer = %peer_addr, "publisher connected");

        loop {
            let frame = tokio::select! {
                _ = cancel.cancelled() => break,
                frame = read_frame(&mut stream) => frame,
            };

            let frame = match frame {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(FrameError::Io(e)) => return Err(e.into()),
                Err(FrameError::Protocol(e)) => {
                    warn!(peer = %peer_addr, error = %e, "malformed frame, closing connection");
                    stream
                        .write_all(&ChannelFrame::Ack(AckStatus::ProtocolError).encode())
                        .await?;
                    break;
                }
            };

            let status = match frame {
                ChannelFrame::Publish { topic, payload } => self.handle_publish(&topic, &payload).await,
                ChannelFrame::Ack(_) => {
                    warn!(peer = %peer_addr, "unexpected ack from publisher, closing connection");
                    stream
                        .write_all(&ChannelFrame::Ack(AckStatus::ProtocolError).encode())
                        .await?;
                    break;
                }
            };

            stream.write_all(&ChannelFrame::Ack(status).encode()).await?;
        }

        debug!(peer = %peer_addr, "publisher disconnected");
        Ok(())
    }

    /// Ingest one published sample and pick the ack status
    async fn handle_publish(&self, topic: &str, payload: &Bytes) -> AckStatus {
        let Some(agent_id) = agent_id_from_topic(topic) else {
            warn!(topic, "topic does not end in an agent id");
            return AckStatus::Rejected;
        };

        let sample = match decode_sample(payload) {
            Ok(sample) => sample,
            Err(e) => {
                warn!(topic, error = %e, "invalid sample payload");
                return AckStatus::Rejected;
            }
        };

        match self
            .service
            .ingest_sample(agent_id, &self.config.default_road_state, &sample)
            .await
        {
            Ok(_) => AckStatus::Accepted,
            Err(e) => {
                warn!(agent_id, error = %e, "failed to persist sample");
                AckStatus::StoreFailed
            }
        }
    }
}

/// Agent id from the last `/`-separated topic segment
pub fn agent_id_from_topic(topic: &str) -> Option<AgentId> {
    topic.rsplit('/').next()?.trim().parse().ok()
}

enum FrameError {
    Io(io::Error),
    Protocol(ProtocolError),
}

/// Read one frame; `None` on a clean close between frames
async fn read_frame(stream: &mut TcpStream) -> Result<Option<ChannelFrame>, FrameError> {
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    match stream.read_exact(&mut prefix).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(FrameError::Io(e)),
    }

    let len = read_length_prefix(&prefix).map_err(FrameError::Protocol)?;
    let mut body = vec![0u8; len as usize];
    stream.read_exact(&mut body).await.map_err(FrameError::Io)?;

    ChannelFrame::decode(Bytes::from(body))
        .map(Some)
        .map_err(FrameError::Protocol)
}
