//! Error types for the tap crate

use std::time::Duration;

use thiserror::Error;

/// Failure to hand a record to one observer
///
/// Delivery is best-effort: these are logged by the distributor and never
/// surface to the ingestion caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Observer's connection is gone
    #[error("observer {observer_id} disconnected")]
    Closed { observer_id: u64 },

    /// Observer's queue stayed full for the whole delivery window
    #[error("observer {observer_id} did not accept the record within {timeout:?}")]
    Timeout { observer_id: u64, timeout: Duration },
}
