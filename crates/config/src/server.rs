//! Server configuration

use std::time::Duration;

use serde::Deserialize;

/// Server configuration
///
/// # Example
///
/// ```toml
/// [server]
/// http_address = "0.0.0.0:8000"
/// channel_address = "0.0.0.0:1883"
/// database = "data/roadpulse.db"
/// delivery_timeout = "1s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP API bind address
    /// Default: 0.0.0.0:8000
    pub http_address: String,

    /// Channel listener bind address
    /// Default: 0.0.0.0:1883
    pub channel_address: String,

    /// Database file, `:memory:`, or `memory` for the in-process store
    /// Default: data/roadpulse.db
    pub database: String,

    /// Road state recorded for samples that arrive over the channel
    /// Default: unclassified
    pub default_road_state: String,

    /// Upper bound on one delivery to one observer
    /// Default: 1s
    #[serde(with = "humantime_serde")]
    pub delivery_timeout: Duration,

    /// Records buffered per observer
    /// Default: 64
    pub observer_queue: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_address: "0.0.0.0:8000".into(),
            channel_address: "0.0.0.0:1883".into(),
            database: "data/roadpulse.db".into(),
            default_road_state: "unclassified".into(),
            delivery_timeout: Duration::from_secs(1),
            observer_queue: 64,
        }
    }
}
