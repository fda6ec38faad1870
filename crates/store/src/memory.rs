//! In-memory record store

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use roadpulse_protocol::{NewRecord, PersistedRecord};

use crate::RecordStore;
use crate::error::Result;

/// Records kept in a `BTreeMap`; id allocation and insert share one lock
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    records: BTreeMap<i64, PersistedRecord>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// All records in id order
    pub fn snapshot(&self) -> Vec<PersistedRecord> {
        self.inner.lock().records.values().cloned().collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, record: NewRecord) -> Result<PersistedRecord> {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;

        let persisted = record.with_id(id);
        inner.records.insert(id, persisted.clone());
        Ok(persisted)
    }

    async fn get(&self, id: i64) -> Result<Option<PersistedRecord>> {
        Ok(self.inner.lock().records.get(&id).cloned())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.inner.lock().records.len() as u64)
    }
}
