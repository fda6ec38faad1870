//! Operations routes
//!
//! Health checks and server metrics endpoints for monitoring and observability.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::error::Result;
use crate::state::AppState;

// =============================================================================
// Response Types
// =============================================================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Server status
    pub status: &'static str,
    /// Records in the store
    pub records: u64,
    /// Connected observers
    pub observers: usize,
}

/// Server metrics response
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    /// Server uptime in seconds
    pub uptime_secs: u64,
    pub ingest: IngestSnapshot,
    pub distribution: DistributionSnapshot,
}

/// Ingestion counters
#[derive(Debug, Serialize)]
pub struct IngestSnapshot {
    pub accepted: u64,
    pub rejected: u64,
}

/// Distribution counters
#[derive(Debug, Serialize)]
pub struct DistributionSnapshot {
    /// Records that reached at least one observer
    pub records: u64,
    pub sent: u64,
    pub failed: u64,
    pub observers: usize,
}

// =============================================================================
// Routes
// =============================================================================

/// Operations routes (health, metrics)
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
///
/// GET /health
///
/// Returns 503 when the store cannot be counted.
async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let records = state.ingestion.store().count().await?;

    Ok(Json(HealthResponse {
        status: "ok",
        records,
        observers: state.registry.observer_count(),
    }))
}

/// Server metrics endpoint
///
/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsResponse> {
    let ingest = state.ingestion.stats();
    let distribution = state.ingestion.distributor().stats();

    Json(MetricsResponse {
        uptime_secs: state.uptime_secs(),
        ingest: IngestSnapshot {
            accepted: ingest.accepted,
            rejected: ingest.rejected,
        },
        distribution: DistributionSnapshot {
            records: distribution.record_count,
            sent: distribution.sent_count,
            failed: distribution.failed_count,
            observers: distribution.observer_count,
        },
    })
}
