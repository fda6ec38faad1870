//! Tests for the turso store

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use roadpulse_protocol::{Accelerometer, Gps, NewRecord};

use crate::{RecordStore, TursoStore, open_store};

fn record(agent_id: i64, road_state: &str) -> NewRecord {
    NewRecord {
        agent_id,
        road_state: road_state.into(),
        accelerometer: Accelerometer::new(-1.5, 0.25, 9.81),
        gps: Gps::new(30.5234, 50.4501),
        timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 15).unwrap(),
    }
}

#[tokio::test]
async fn test_insert_and_get_round_trip() {
    let store = TursoStore::open_memory().await.unwrap();

    let inserted = store.insert(record(7, "pothole")).await.unwrap();
    assert_eq!(inserted.id, 1);

    let fetched = store.get(1).await.unwrap().unwrap();
    assert_eq!(fetched, inserted);
    assert_eq!(fetched.gps.latitude, 50.4501);
    assert_eq!(fetched.road_state, "pothole");
}

#[tokio::test]
async fn test_get_missing() {
    let store = TursoStore::open_memory().await.unwrap();
    assert!(store.get(42).await.unwrap().is_none());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_ids_continue_after_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("records.db");
    let path = path.to_str().unwrap();

    {
        let store = TursoStore::open(path).await.unwrap();
        store.insert(record(1, "smooth")).await.unwrap();
        store.insert(record(1, "smooth")).await.unwrap();
    }

    let store = TursoStore::open(path).await.unwrap();
    let next = store.insert(record(2, "bumpy")).await.unwrap();
    assert_eq!(next.id, 3);
    assert_eq!(store.count().await.unwrap(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inserts_get_unique_ids() {
    let store = Arc::new(TursoStore::open_memory().await.unwrap());

    let tasks: Vec<_> = (0..50)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.insert(record(i, "smooth")).await.unwrap().id })
        })
        .collect();

    let ids: BTreeSet<i64> = futures_util::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    assert_eq!(ids, (1..=50).collect::<BTreeSet<i64>>());
}

#[tokio::test]
async fn test_open_store_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.db");

    let store = open_store(path.to_str().unwrap()).await.unwrap();
    store.insert(record(3, "smooth")).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_insert_recovers_after_foreign_row() {
    let store = TursoStore::open_memory().await.unwrap();
    assert_eq!(store.insert(record(1, "smooth")).await.unwrap().id, 1);

    // Row written behind the store's back takes the next id
    store
        .execute_raw(
            "INSERT INTO processed_agent_data (id, road_state, agent_id, x, y, z, latitude, longitude, timestamp) \
             VALUES (2, 'bumpy', 9, 0.0, 0.0, 9.8, 50.45, 30.52, '2024-03-01T12:00:00Z')",
        )
        .await
        .unwrap();

    let next = store.insert(record(1, "smooth")).await.unwrap();
    assert_eq!(next.id, 3);
    assert_eq!(store.insert(record(1, "smooth")).await.unwrap().id, 4);

    assert_eq!(store.count().await.unwrap(), 4);
    assert_eq!(store.get(2).await.unwrap().unwrap().agent_id, 9);
    assert_eq!(store.get(3).await.unwrap().unwrap(), next);
}
