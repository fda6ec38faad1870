//! API routes

pub mod ingest;
pub mod observe;
pub mod ops;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Operations routes (health, metrics)
        .merge(ops::routes())
        .merge(ingest::routes())
        .merge(observe::routes())
        .with_state(state)
}
