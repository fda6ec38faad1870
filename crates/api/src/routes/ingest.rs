//! Ingestion route
//!
//! Accepts a JSON array of processed agent data documents. Every document is
//! validated on its own, so one bad sample never fails the whole batch.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use bytes::Bytes;
use serde_json::Value;

use roadpulse_pipeline::IngestReport;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Ingestion routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/processed_agent_data/", post(ingest_handler))
        .route("/processed_agent_data", post(ingest_handler))
}

/// Ingest a batch
///
/// POST /processed_agent_data/
///
/// 200 when something was accepted (or the batch was empty), 422 when every
/// sample was rejected, 400 when the body is not a JSON array.
async fn ingest_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<IngestReport>)> {
    let batch = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Array(batch)) => batch,
        Ok(_) => return Err(ApiError::bad_request("expected a JSON array of samples")),
        Err(e) => return Err(ApiError::bad_request(format!("invalid JSON body: {e}"))),
    };

    let report = state.ingestion.ingest(batch).await;
    let status = if report.all_rejected() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };

    Ok((status, Json(report)))
}
