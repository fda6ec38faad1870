//! Observer handles
//!
//! Each live connection gets an `ObserverHandle`: a unique id plus the sending
//! half of a bounded channel. The connection task owns the receiving half and
//! forwards whatever arrives to its socket.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;

use crate::error::DeliveryError;

/// Counter for generating unique observer IDs
static OBSERVER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Default per-observer queue length
pub const DEFAULT_OBSERVER_QUEUE: usize = 64;

/// Sending side of one observer connection
#[derive(Debug, Clone)]
pub struct ObserverHandle {
    id: u64,
    sender: mpsc::Sender<Bytes>,
}

impl ObserverHandle {
    /// Create a handle and the receiver its connection task drains
    pub fn channel(queue: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (sender, receiver) = mpsc::channel(queue.max(1));
        let handle = Self {
            id: OBSERVER_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
            sender,
        };
        (handle, receiver)
    }

    /// Get the observer ID
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Check if the connection task is still receiving
    #[inline]
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queue a payload, waiting at most `timeout` for space
    pub async fn send(&self, payload: Bytes, timeout: Duration) -> Result<(), DeliveryError> {
        self.sender
            .send_timeout(payload, timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Closed(_) => DeliveryError::Closed {
                    observer_id: self.id,
                },
                SendTimeoutError::Timeout(_) => DeliveryError::Timeout {
                    observer_id: self.id,
                    timeout,
                },
            })
    }
}
