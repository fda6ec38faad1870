//! Distributor - pushes persisted records to live observers
//!
//! The record is encoded once and sent to every observer of its agent
//! concurrently. Each send is bounded by the delivery timeout, so one slow
//! observer delays delivery by at most that long and never blocks the
//! others.
//!
//! # Usage
//!
//! ```ignore
//! let registry = Arc::new(SubscriptionRegistry::new());
//! let distributor = Distributor::new(Arc::clone(&registry), Duration::from_secs(1));
//!
//! let report = distributor.deliver(&record).await;  // no-op if nobody watches
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, trace, warn};

use roadpulse_protocol::{PersistedRecord, encode_record};

use crate::error::DeliveryError;
use crate::registry::SubscriptionRegistry;

/// Default time an observer gets to accept one record
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(1);

/// Outcome of delivering one record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Observers registered for the agent at delivery time
    pub attempted: usize,
    /// Observers that accepted the record
    pub delivered: usize,
    /// Observers that were closed or timed out
    pub failed: usize,
}

impl DeliveryReport {
    /// Every attempted observer got the record
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Fans persisted records out to the observers of their agent
#[derive(Debug)]
pub struct Distributor {
    registry: Arc<SubscriptionRegistry>,
    delivery_timeout: Duration,
    /// Total records delivered to at least one observer
    record_count: AtomicU64,
    /// Total successful sends
    sent_count: AtomicU64,
    /// Total failed sends
    failed_count: AtomicU64,
}

impl Distributor {
    pub fn new(registry: Arc<SubscriptionRegistry>, delivery_timeout: Duration) -> Self {
        Self {
            registry,
            delivery_timeout,
            record_count: AtomicU64::new(0),
            sent_count: AtomicU64::new(0),
            failed_count: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    pub fn delivery_timeout(&self) -> Duration {
        self.delivery_timeout
    }

    /// Deliver a record to every observer of its agent
    ///
    /// Never fails: per-observer errors are logged and counted in the report.
    pub async fn deliver(&self, record: &PersistedRecord) -> DeliveryReport {
        // Snapshot taken here; the registry lock is released before sending
        let observers = self.registry.observers(record.agent_id);
        if observers.is_empty() {
            return DeliveryReport::default();
        }

        let attempted = observers.len();
        let payload = match encode_record(record) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(id = record.id, error = %e, "failed to encode record for observers");
                self.failed_count
                    .fetch_add(attempted as u64, Ordering::Relaxed);
                return DeliveryReport {
                    attempted,
                    delivered: 0,
                    failed: attempted,
                };
            }
        };

        let results = join_all(
            observers
                .iter()
                .map(|observer| observer.send(payload.clone(), self.delivery_timeout)),
        )
        .await;

        let mut report = DeliveryReport {
            attempted,
            ..Default::default()
        };
        for result in results {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    match e {
                        DeliveryError::Closed { observer_id } => {
                            debug!(agent_id = record.agent_id, observer_id, "observer gone before delivery");
                        }
                        DeliveryError::Timeout { observer_id, .. } => {
                            warn!(agent_id = record.agent_id, observer_id, error = %e, "observer delivery timed out");
                        }
                    }
                }
            }
        }

        if report.delivered > 0 {
            self.record_count.fetch_add(1, Ordering::Relaxed);
        }
        self.sent_count
            .fetch_add(report.delivered as u64, Ordering::Relaxed);
        self.failed_count
            .fetch_add(report.failed as u64, Ordering::Relaxed);

        trace!(
            id = record.id,
            agent_id = record.agent_id,
            delivered = report.delivered,
            failed = report.failed,
            "record distributed"
        );
        report
    }

    /// Get distribution statistics
    pub fn stats(&self) -> DistributorStats {
        DistributorStats {
            record_count: self.record_count.load(Ordering::Relaxed),
            sent_count: self.sent_count.load(Ordering::Relaxed),
            failed_count: self.failed_count.load(Ordering::Relaxed),
            observer_count: self.registry.observer_count(),
        }
    }
}

/// Statistics about the distributor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributorStats {
    /// Records that reached at least one observer
    pub record_count: u64,
    /// Successful sends
    pub sent_count: u64,
    /// Failed sends
    pub failed_count: u64,
    /// Current number of observers
    pub observer_count: usize,
}
