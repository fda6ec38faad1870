//! Application state
//!
//! Shared state for API handlers: the ingestion service and the registry
//! observers are added to.

use std::sync::Arc;
use std::time::Instant;

use roadpulse_pipeline::IngestionService;
use roadpulse_tap::{DEFAULT_OBSERVER_QUEUE, SubscriptionRegistry};

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Validates, persists and distributes samples
    pub ingestion: Arc<IngestionService>,
    /// Live observer registrations
    pub registry: Arc<SubscriptionRegistry>,
    /// Queue length for each new observer
    pub observer_queue: usize,
    /// Server start time for uptime calculation
    pub start_time: Instant,
}

impl AppState {
    /// Build state around an ingestion service
    ///
    /// Observers are registered in the same registry the service's
    /// distributor reads from.
    pub fn new(ingestion: Arc<IngestionService>) -> Self {
        let registry = Arc::clone(ingestion.distributor().registry());
        Self {
            ingestion,
            registry,
            observer_queue: DEFAULT_OBSERVER_QUEUE,
            start_time: Instant::now(),
        }
    }

    /// Set the per-observer queue length
    pub fn with_observer_queue(mut self, queue: usize) -> Self {
        self.observer_queue = queue;
        self
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
