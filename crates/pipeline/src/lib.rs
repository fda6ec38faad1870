//! Roadpulse Pipeline - server-side ingestion
//!
//! Everything between an inbound sample and a persisted, distributed record.
//!
//! # Architecture
//!
//! ```text
//! [Inbound]                         [IngestionService]                [Out]
//!   HTTP POST ──── Vec<RawSample> ──┐                             ┌──→ RecordStore (id assigned)
//!                                   ├──→ validate ──→ persist ────┤
//!   ChannelListener ─ sample ───────┘                             └──→ Distributor ──→ observers
//!        ▲
//!        └── Publish frames from the replay publisher, acked after persist
//! ```
//!
//! # Key Design
//!
//! - **Sequential batches**: samples of one batch are handled in input order
//! - **Per-sample failure**: a bad sample is reported, the batch continues
//! - **Persist then acknowledge**: the channel ack is written after the insert
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use roadpulse_pipeline::IngestionService;
//! use roadpulse_store::MemoryStore;
//! use roadpulse_tap::{Distributor, SubscriptionRegistry};
//!
//! let registry = Arc::new(SubscriptionRegistry::new());
//! let service = IngestionService::new(
//!     Arc::new(MemoryStore::new()),
//!     Distributor::new(registry, Duration::from_secs(1)),
//! );
//!
//! let report = service.ingest(serde_json::from_str(body)?).await;
//! ```

mod channel;
mod error;
mod ingest;

pub use channel::{ChannelListener, ChannelListenerConfig, DEFAULT_ROAD_STATE, agent_id_from_topic};
pub use error::{IngestError, ListenerError};
pub use ingest::{IngestReport, IngestStats, IngestionService, RawSample, Rejection, validate};

#[cfg(test)]
mod channel_test;
