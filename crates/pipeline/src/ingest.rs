//! Ingestion service
//!
//! Validates inbound samples, persists them and hands each persisted record
//! to the distributor. Samples of one batch are processed strictly in input
//! order: sample N+1 is not validated until sample N has been persisted and
//! delivered.
//!
//! Concurrent callers (HTTP requests, channel connections) share one
//! service; id allocation is left to the store, which does it atomically.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::{debug, warn};

use roadpulse_protocol::{
    AgentData, AgentId, AggregateSample, NewRecord, PersistedRecord, ProcessedAgentData,
};
use roadpulse_store::{RecordStore, StoreError};
use roadpulse_tap::Distributor;

use crate::error::IngestError;

/// One untyped inbound document
pub type RawSample = serde_json::Value;

/// A sample that was not ingested, as reported to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Position in the submitted batch
    pub index: usize,
    /// What went wrong
    pub error: String,
}

impl From<&IngestError> for Rejection {
    fn from(err: &IngestError) -> Self {
        Self {
            index: err.index(),
            error: err.reason(),
        }
    }
}

/// Outcome of one batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Persisted records, in input order
    pub accepted: Vec<PersistedRecord>,
    /// Samples that were skipped
    pub rejected: Vec<Rejection>,
}

impl IngestReport {
    /// Every sample was rejected (and there was at least one)
    pub fn all_rejected(&self) -> bool {
        self.accepted.is_empty() && !self.rejected.is_empty()
    }
}

/// Lifetime ingestion counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub accepted: u64,
    pub rejected: u64,
}

/// Validates, persists and distributes inbound samples
pub struct IngestionService {
    store: Arc<dyn RecordStore>,
    distributor: Distributor,
    accepted: AtomicU64,
    rejected: AtomicU64,
}

impl IngestionService {
    pub fn new(store: Arc<dyn RecordStore>, distributor: Distributor) -> Self {
        Self {
            store,
            distributor,
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn distributor(&self) -> &Distributor {
        &self.distributor
    }

    /// Ingest a batch of raw documents
    ///
    /// A sample that fails validation or storage is reported in
    /// `rejected`; the batch carries on with the next one.
    pub async fn ingest(&self, batch: Vec<RawSample>) -> IngestReport {
        let mut report = IngestReport::default();

        for (index, raw) in batch.into_iter().enumerate() {
            match self.ingest_raw(index, raw).await {
                Ok(record) => report.accepted.push(record),
                Err(e) => {
                    warn!(index, error = %e, "sample rejected");
                    report.rejected.push(Rejection::from(&e));
                }
            }
        }

        debug!(
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            "batch ingested"
        );
        report
    }

    /// Ingest an already-typed sample for an agent
    ///
    /// Used by the channel listener, where the agent comes from the topic and
    /// the road state from configuration.
    pub async fn ingest_sample(
        &self,
        agent_id: AgentId,
        road_state: &str,
        sample: &AggregateSample,
    ) -> Result<PersistedRecord, StoreError> {
        let data = ProcessedAgentData {
            road_state: road_state.to_string(),
            agent_data: AgentData::from_sample(agent_id, sample),
        };
        let result = self.persist_and_deliver(data).await;
        self.count(result.is_ok());
        result
    }

    /// Validate and ingest one document
    async fn ingest_raw(&self, index: usize, raw: RawSample) -> Result<PersistedRecord, IngestError> {
        let result = match validate(index, raw) {
            Ok(data) => self
                .persist_and_deliver(data)
                .await
                .map_err(|error| IngestError::Store { index, error }),
            Err(e) => Err(e),
        };
        self.count(result.is_ok());
        result
    }

    /// Persist, then deliver to live observers
    async fn persist_and_deliver(&self, data: ProcessedAgentData) -> Result<PersistedRecord, StoreError> {
        let record = self.store.insert(NewRecord::from(data)).await?;
        let delivery = self.distributor.deliver(&record).await;

        debug!(
            id = record.id,
            agent_id = record.agent_id,
            delivered = delivery.delivered,
            failed = delivery.failed,
            "record ingested"
        );
        Ok(record)
    }

    fn count(&self, accepted: bool) {
        let counter = if accepted { &self.accepted } else { &self.rejected };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get ingestion statistics
    pub fn stats(&self) -> IngestStats {
        IngestStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Coerce a raw document into `ProcessedAgentData`
pub fn validate(index: usize, raw: RawSample) -> Result<ProcessedAgentData, IngestError> {
    serde_json::from_value(raw).map_err(|e| IngestError::validation(index, e.to_string()))
}
