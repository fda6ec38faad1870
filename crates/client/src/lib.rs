//! Roadpulse Client - replay publisher
//!
//! Drives a `MultiStreamReader` on a fixed cadence and publishes every sample
//! over the message channel to the ingestion server.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use roadpulse_client::{Publisher, PublisherConfig, TcpChannel};
//! use tokio_util::sync::CancellationToken;
//!
//! let mut channel = TcpChannel::connect("127.0.0.1:1883", Duration::from_secs(5)).await?;
//! let publisher = Publisher::new(PublisherConfig {
//!     topic: "agent_data/1".into(),
//!     interval: Duration::from_millis(500),
//!     max_samples: None,
//! });
//!
//! let stats = publisher.run(&mut channel, &mut reader, CancellationToken::new()).await;
//! ```

mod channel;
mod error;
mod publisher;

pub use channel::{Channel, TcpChannel};
pub use error::{ChannelError, Result};
pub use publisher::{PublishStats, Publisher, PublisherConfig};
