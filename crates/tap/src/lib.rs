//! Roadpulse Tap - live distribution of persisted records
//!
//! Observers connect for one agent id and receive every record persisted for
//! that agent from then on. Nothing is replayed for late joiners.
//!
//! - Per-agent registry behind one lock, never held across an await
//! - Bounded per-observer queues; a slow observer only delays itself
//! - Registrations are released by a drop guard when the connection ends
//!
//! # Architecture
//!
//! ```text
//! IngestionService
//!     │ persisted record
//!     ▼
//! Distributor ── observers(agent_id) ──► SubscriptionRegistry
//!     │
//!     ├──► ObserverHandle (mpsc) ──► connection task ──► socket
//!     └──► ObserverHandle (mpsc) ──► connection task ──► socket
//! ```

mod distributor;
mod error;
mod observer;
mod registry;

pub use distributor::{DEFAULT_DELIVERY_TIMEOUT, DeliveryReport, Distributor, DistributorStats};
pub use error::DeliveryError;
pub use observer::{DEFAULT_OBSERVER_QUEUE, ObserverHandle};
pub use registry::{Subscription, SubscriptionRegistry};

#[cfg(test)]
mod registry_test;
