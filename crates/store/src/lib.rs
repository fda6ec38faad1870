//! Roadpulse Store - persistence for ingested samples
//!
//! Every accepted sample becomes one row in `processed_agent_data`. The store
//! is the only place ids are assigned, so concurrent ingestion never produces
//! duplicates.
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`TursoStore`] | SQLite-compatible file (or `:memory:`) via turso |
//! | [`MemoryStore`] | `BTreeMap` behind a mutex, for tests and throwaway runs |
//!
//! # Usage
//!
//! ```ignore
//! use roadpulse_store::open_store;
//!
//! let store = open_store("data/roadpulse.db").await?;
//! let record = store.insert(new_record).await?;
//! assert_eq!(store.get(record.id).await?, Some(record));
//! ```

mod db;
mod error;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use roadpulse_protocol::{NewRecord, PersistedRecord};

pub use db::TursoStore;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;

/// `database` value selecting the in-process map
pub const MEMORY_DATABASE: &str = "memory";

/// Record persistence
///
/// `insert` assigns the id; ids are unique and strictly increasing in insert
/// order.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a record, returning it with its assigned id
    async fn insert(&self, record: NewRecord) -> Result<PersistedRecord>;

    /// Look up a record by id
    async fn get(&self, id: i64) -> Result<Option<PersistedRecord>>;

    /// Number of stored records
    async fn count(&self) -> Result<u64>;
}

/// Open the backend named by a `server.database` setting
///
/// `"memory"` selects [`MemoryStore`]; anything else is a turso path
/// (`":memory:"` included).
pub async fn open_store(database: &str) -> Result<Arc<dyn RecordStore>> {
    if database == MEMORY_DATABASE {
        return Ok(Arc::new(MemoryStore::new()));
    }
    Ok(Arc::new(TursoStore::open(database).await?))
}

#[cfg(test)]
mod db_test;
