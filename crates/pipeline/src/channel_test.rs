//! Tests for the channel listener

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use roadpulse_client::{Channel, ChannelError, TcpChannel};
use roadpulse_protocol::{
    Accelerometer, AckStatus, AggregateSample, ChannelFrame, Gps, encode_sample, read_length_prefix,
};
use roadpulse_store::{MemoryStore, RecordStore};
use roadpulse_tap::{Distributor, SubscriptionRegistry};

use crate::channel::{ChannelListener, ChannelListenerConfig, agent_id_from_topic};
use crate::ingest::IngestionService;

const ACK_TIMEOUT: Duration = Duration::from_secs(2);

struct Harness {
    addr: String,
    store: Arc<MemoryStore>,
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<Result<(), crate::ListenerError>>,
}

async fn start() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(SubscriptionRegistry::new());
    let service = Arc::new(IngestionService::new(
        store.clone(),
        Distributor::new(registry, Duration::from_millis(100)),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let cancel = CancellationToken::new();

    let channel_listener = ChannelListener::new(ChannelListenerConfig::default(), service);
    let handle = tokio::spawn(channel_listener.serve(listener, cancel.clone()));

    Harness {
        addr,
        store,
        cancel,
        handle,
    }
}

fn sample() -> AggregateSample {
    AggregateSample::new(
        Accelerometer::new(1.0, 2.0, 3.0),
        Gps::new(10.0, 20.0),
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    )
}

async fn read_ack(stream: &mut TcpStream) -> AckStatus {
    let mut prefix = [0u8; 4];
    stream.read_exact(&mut prefix).await.unwrap();
    let len = read_length_prefix(&prefix).unwrap();
    let mut body = vec![0u8; len as usize];
    stream.read_exact(&mut body).await.unwrap();
    match ChannelFrame::decode(Bytes::from(body)).unwrap() {
        ChannelFrame::Ack(status) => status,
        other => panic!("expected ack, got {other:?}"),
    }
}

// ============================================================================
// Topic parsing
// ============================================================================

#[test]
fn test_agent_id_from_topic() {
    assert_eq!(agent_id_from_topic("agent_data/7"), Some(7));
    assert_eq!(agent_id_from_topic("fleet/north/agent_data/42"), Some(42));
    assert_eq!(agent_id_from_topic("12"), Some(12));
    assert_eq!(agent_id_from_topic("agent_data/"), None);
    assert_eq!(agent_id_from_topic("agent_data/abc"), None);
}

// ============================================================================
// End to end
// ============================================================================

#[tokio::test]
async fn test_published_sample_is_persisted_before_ack() {
    let harness = start().await;
    let mut channel = TcpChannel::connect(harness.addr.clone(), ACK_TIMEOUT)
        .await
        .unwrap();

    channel
        .publish("agent_data/7", encode_sample(&sample()).unwrap())
        .await
        .unwrap();

    // Ack received, so the record must already be stored
    let record = harness.store.get(1).await.unwrap().unwrap();
    assert_eq!(record.agent_id, 7);
    assert_eq!(record.road_state, "unclassified");
    assert_eq!(record.accelerometer.z, 3.0);

    channel.close().await.unwrap();
    harness.cancel.cancel();
}

#[tokio::test]
async fn test_bad_topic_is_rejected() {
    let harness = start().await;
    let mut channel = TcpChannel::connect(harness.addr.clone(), ACK_TIMEOUT)
        .await
        .unwrap();

    let err = channel
        .publish("agent_data/abc", encode_sample(&sample()).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ChannelError::Rejected {
            status: AckStatus::Rejected
        }
    ));
    assert_eq!(harness.store.count().await.unwrap(), 0);

    // Connection stays usable
    channel
        .publish("agent_data/3", encode_sample(&sample()).unwrap())
        .await
        .unwrap();
    assert_eq!(harness.store.count().await.unwrap(), 1);
    harness.cancel.cancel();
}

#[tokio::test]
async fn test_bad_payload_is_rejected() {
    let harness = start().await;
    let mut channel = TcpChannel::connect(harness.addr.clone(), ACK_TIMEOUT)
        .await
        .unwrap();

    let err = channel
        .publish("agent_data/1", Bytes::from_static(b"{\"not\":\"a sample\"}"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ChannelError::Rejected {
            status: AckStatus::Rejected
        }
    ));
    harness.cancel.cancel();
}

#[tokio::test]
async fn test_unknown_frame_type_closes_connection() {
    let harness = start().await;
    let mut stream = TcpStream::connect(&harness.addr).await.unwrap();

    // length 2, type 0x7F, one body byte
    stream.write_all(&[0, 0, 0, 2, 0x7F, 0]).await.unwrap();

    assert_eq!(read_ack(&mut stream).await, AckStatus::ProtocolError);

    let mut rest = Vec::new();
    let n = tokio::time::timeout(Duration::from_secs(1), stream.read_to_end(&mut rest))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(n, 0);
    harness.cancel.cancel();
}

#[tokio::test]
async fn test_multiple_publishers() {
    let harness = start().await;

    let mut tasks = Vec::new();
    for agent in 1..=4 {
        let addr = harness.addr.clone();
        tasks.push(tokio::spawn(async move {
            let mut channel = TcpChannel::connect(addr, ACK_TIMEOUT).await.unwrap();
            for _ in 0..5 {
                channel
                    .publish(&format!("agent_data/{agent}"), encode_sample(&sample()).unwrap())
                    .await
                    .unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(harness.store.count().await.unwrap(), 20);
    let ids: Vec<i64> = harness.store.snapshot().iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=20).collect::<Vec<i64>>());
    harness.cancel.cancel();
}

#[tokio::test]
async fn test_cancel_stops_listener() {
    let harness = start().await;
    harness.cancel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(1), harness.handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}
