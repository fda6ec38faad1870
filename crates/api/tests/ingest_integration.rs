//! Integration tests for the ingestion, observer and operations routes

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use roadpulse_api::{AppState, build_router};
use roadpulse_pipeline::IngestionService;
use roadpulse_store::{MemoryStore, RecordStore};
use roadpulse_tap::{Distributor, ObserverHandle, SubscriptionRegistry};

fn test_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(SubscriptionRegistry::new());
    let ingestion = Arc::new(IngestionService::new(
        store.clone(),
        Distributor::new(registry, Duration::from_millis(100)),
    ));
    (AppState::new(ingestion), store)
}

fn test_app() -> (Router, AppState, Arc<MemoryStore>) {
    let (state, store) = test_state();
    (build_router(state.clone()), state, store)
}

fn json_request(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn sample(agent_id: i64, road_state: &str) -> Value {
    json!({
        "road_state": road_state,
        "agent_data": {
            "agent_id": agent_id,
            "accelerometer": {"x": 0.1, "y": -0.2, "z": 9.8},
            "gps": {"longitude": 30.52, "latitude": 50.45},
            "timestamp": "2024-03-01T12:00:00Z"
        }
    })
}

// =============================================================================
// Ingestion
// =============================================================================

#[tokio::test]
async fn test_ingest_batch() {
    let (app, _state, store) = test_app();
    let body = json!([sample(7, "smooth"), sample(8, "pothole")]);

    let response = app
        .oneshot(json_request("/processed_agent_data/", body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["accepted"][0]["id"], 1);
    assert_eq!(json["accepted"][1]["id"], 2);
    assert_eq!(json["accepted"][1]["road_state"], "pothole");
    assert_eq!(json["rejected"], json!([]));
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_ingest_without_trailing_slash() {
    let (app, _state, _store) = test_app();

    let response = app
        .oneshot(json_request(
            "/processed_agent_data",
            json!([sample(1, "smooth")]).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ingest_partial_rejection_is_ok() {
    let (app, _state, _store) = test_app();
    let mut bad = sample(7, "smooth");
    bad["agent_data"]["timestamp"] = json!("not a time");

    let response = app
        .oneshot(json_request(
            "/processed_agent_data/",
            json!([bad, sample(7, "smooth")]).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["accepted"].as_array().unwrap().len(), 1);
    assert_eq!(json["rejected"][0]["index"], 0);
}

#[tokio::test]
async fn test_ingest_all_rejected() {
    let (app, _state, store) = test_app();

    let response = app
        .oneshot(json_request(
            "/processed_agent_data/",
            json!([{"road_state": "smooth"}]).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(
        json["rejected"][0]["error"]
            .as_str()
            .unwrap()
            .contains("agent_data")
    );
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_ingest_empty_batch() {
    let (app, _state, _store) = test_app();

    let response = app
        .oneshot(json_request("/processed_agent_data/", "[]"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ingest_requires_array() {
    let (app, _state, _store) = test_app();

    let response = app
        .oneshot(json_request(
            "/processed_agent_data/",
            sample(7, "smooth").to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_ingest_invalid_json() {
    let (app, _state, _store) = test_app();

    let response = app
        .oneshot(json_request("/processed_agent_data/", "[{"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ingested_record_reaches_registered_observer() {
    let (app, state, _store) = test_app();
    let (handle, mut rx) = ObserverHandle::channel(4);
    let _subscription = state.registry.subscribe_guarded(7, handle);

    let response = app
        .oneshot(json_request(
            "/processed_agent_data/",
            json!([sample(8, "smooth"), sample(7, "bumpy")]).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let payload = rx.try_recv().unwrap();
    let record: Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(record["id"], 2);
    assert_eq!(record["agent_id"], 7);
    assert_eq!(record["road_state"], "bumpy");
    assert!(rx.try_recv().is_err());
}

// =============================================================================
// Observer route
// =============================================================================

#[tokio::test]
async fn test_observe_rejects_non_numeric_agent() {
    let (app, _state, _store) = test_app();

    let response = app.oneshot(get("/ws/abc")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_observe_requires_upgrade() {
    let (app, state, _store) = test_app();

    let response = app.oneshot(get("/ws/7")).await.unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(state.registry.observer_count(), 0);
}

// =============================================================================
// Operations
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (app, state, _store) = test_app();
    let (handle, _rx) = ObserverHandle::channel(4);
    state.registry.subscribe(3, handle);
    state
        .ingestion
        .ingest(vec![sample(3, "smooth")])
        .await;

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["records"], 1);
    assert_eq!(json["observers"], 1);
}

#[tokio::test]
async fn test_metrics() {
    let (app, state, _store) = test_app();
    let (handle, _rx) = ObserverHandle::channel(4);
    state.registry.subscribe(3, handle);
    state
        .ingestion
        .ingest(vec![sample(3, "smooth"), json!({}), sample(4, "smooth")])
        .await;

    let response = app.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ingest"]["accepted"], 2);
    assert_eq!(json["ingest"]["rejected"], 1);
    assert_eq!(json["distribution"]["records"], 1);
    assert_eq!(json["distribution"]["sent"], 1);
    assert_eq!(json["distribution"]["failed"], 0);
    assert_eq!(json["distribution"]["observers"], 1);
    assert!(json["uptime_secs"].is_u64());
}
