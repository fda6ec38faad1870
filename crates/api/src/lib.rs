//! Roadpulse API - HTTP surface of the server
//!
//! # Routes
//!
//! - `POST /processed_agent_data/` ingests a JSON array of samples
//! - `GET /ws/{agent_id}` streams newly persisted records for one agent
//! - `GET /health` and `GET /metrics` for operations
//!
//! # Example
//!
//! ```ignore
//! use roadpulse_api::{AppState, build_router};
//!
//! let router = build_router(AppState::new(ingestion));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorResponse, Result};
pub use routes::build_router;
pub use state::AppState;
