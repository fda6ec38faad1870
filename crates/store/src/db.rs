//! Turso-backed record store
//!
//! One writer connection is shared behind an async mutex. The next id is
//! seeded from `MAX(id)` when the database is opened and advanced only after
//! a successful insert, both under that mutex. A failed insert re-reads
//! `MAX(id)` and retries once if the table has moved past the counter.

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use turso::{Builder, Connection, Database, Value};

use roadpulse_protocol::{Accelerometer, Gps, NewRecord, PersistedRecord, timestamp};

use crate::RecordStore;
use crate::error::{Result, StoreError};

const IN_MEMORY: &str = ":memory:";

/// Record store on a turso database
pub struct TursoStore {
    // Keeps the database alive for the connection
    _db: Database,
    writer: Mutex<Writer>,
}

struct Writer {
    conn: Connection,
    next_id: i64,
}

impl TursoStore {
    /// Open (or create) a database file, or `":memory:"`
    pub async fn open(path: &str) -> Result<Self> {
        if path != IN_MEMORY
            && let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        info!(path, "opening record database");
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        conn.execute(SCHEMA_PROCESSED_AGENT_DATA, ()).await?;
        conn.execute(INDEX_AGENT_ID, ()).await?;

        let next_id = max_id(&conn).await? + 1;
        debug!(next_id, "record database ready");

        Ok(Self {
            _db: db,
            writer: Mutex::new(Writer { conn, next_id }),
        })
    }

    /// Open a private in-memory database
    pub async fn open_memory() -> Result<Self> {
        Self::open(IN_MEMORY).await
    }
}

#[cfg(test)]
impl TursoStore {
    /// Run a statement on the writer connection, bypassing id allocation
    pub(crate) async fn execute_raw(&self, sql: &str) -> Result<()> {
        let writer = self.writer.lock().await;
        writer.conn.execute(sql, ()).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for TursoStore {
    async fn insert(&self, record: NewRecord) -> Result<PersistedRecord> {
        let mut writer = self.writer.lock().await;

        if let Err(first) = insert_row(&writer.conn, writer.next_id, &record).await {
            // Rows written outside this store can leave the counter behind the table
            let next_id = max_id(&writer.conn).await? + 1;
            if next_id <= writer.next_id {
                return Err(first);
            }
            warn!(stale_id = writer.next_id, next_id, error = %first, "id counter behind table, resyncing");
            writer.next_id = next_id;
            insert_row(&writer.conn, next_id, &record).await?;
        }

        let id = writer.next_id;
        writer.next_id += 1;
        Ok(record.with_id(id))
    }

    async fn get(&self, id: i64) -> Result<Option<PersistedRecord>> {
        let writer = self.writer.lock().await;

        let mut rows = writer
            .conn
            .query(
                r#"
                SELECT id, road_state, agent_id, x, y, z, latitude, longitude, timestamp
                FROM processed_agent_data WHERE id = ?1
                "#,
                [Value::Integer(id)],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn count(&self) -> Result<u64> {
        let writer = self.writer.lock().await;

        let mut rows = writer
            .conn
            .query("SELECT COUNT(*) FROM processed_agent_data", ())
            .await?;

        let count = match rows.next().await? {
            Some(row) => integer(&row.get_value(0)?).unwrap_or(0),
            None => 0,
        };
        Ok(count.max(0) as u64)
    }
}

async fn insert_row(conn: &Connection, id: i64, record: &NewRecord) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO processed_agent_data (id, road_state, agent_id, x, y, z, latitude, longitude, timestamp)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        [
            Value::Integer(id),
            Value::Text(record.road_state.clone()),
            Value::Integer(record.agent_id),
            Value::Real(record.accelerometer.x),
            Value::Real(record.accelerometer.y),
            Value::Real(record.accelerometer.z),
            Value::Real(record.gps.latitude),
            Value::Real(record.gps.longitude),
            Value::Text(timestamp::format(&record.timestamp)),
        ],
    )
    .await?;
    Ok(())
}

async fn max_id(conn: &Connection) -> Result<i64> {
    let mut rows = conn
        .query("SELECT MAX(id) FROM processed_agent_data", ())
        .await?;

    // MAX over an empty table is NULL
    Ok(match rows.next().await? {
        Some(row) => integer(&row.get_value(0)?).unwrap_or(0),
        None => 0,
    })
}

fn row_to_record(row: &turso::Row) -> Result<PersistedRecord> {
    let id = integer(&row.get_value(0)?).ok_or_else(|| StoreError::invalid("id", "not an integer"))?;
    let road_state = match row.get_value(1)? {
        Value::Text(s) => s,
        _ => String::new(),
    };
    let agent_id = integer(&row.get_value(2)?)
        .ok_or_else(|| StoreError::invalid("agent_id", "not an integer"))?;

    let x = real(&row.get_value(3)?, "x")?;
    let y = real(&row.get_value(4)?, "y")?;
    let z = real(&row.get_value(5)?, "z")?;
    let latitude = real(&row.get_value(6)?, "latitude")?;
    let longitude = real(&row.get_value(7)?, "longitude")?;

    let ts = match row.get_value(8)? {
        Value::Text(s) => timestamp::parse(&s).map_err(|e| StoreError::invalid("timestamp", e.to_string()))?,
        _ => return Err(StoreError::invalid("timestamp", "not text")),
    };

    Ok(PersistedRecord {
        id,
        agent_id,
        road_state,
        accelerometer: Accelerometer::new(x, y, z),
        gps: Gps::new(longitude, latitude),
        timestamp: ts,
    })
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(v) => Some(*v),
        _ => None,
    }
}

fn real(value: &Value, field: &'static str) -> Result<f64> {
    match value {
        Value::Real(v) => Ok(*v),
        Value::Integer(v) => Ok(*v as f64),
        _ => Err(StoreError::invalid(field, "not a number")),
    }
}

// =============================================================================
// Schema
// =============================================================================

const SCHEMA_PROCESSED_AGENT_DATA: &str = r#"
CREATE TABLE IF NOT EXISTS processed_agent_data (
    id INTEGER PRIMARY KEY,
    road_state TEXT NOT NULL,
    agent_id INTEGER NOT NULL,
    x REAL NOT NULL,
    y REAL NOT NULL,
    z REAL NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    timestamp TEXT NOT NULL
)
"#;

const INDEX_AGENT_ID: &str =
    "CREATE INDEX IF NOT EXISTS idx_processed_agent_data_agent ON processed_agent_data(agent_id)";
