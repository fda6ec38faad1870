//! Publisher configuration
//!
//! Where the recorded feeds live, how to read them and where to send the
//! assembled samples.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Column type of a recorded feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Float,
}

/// One recorded feed
///
/// ```toml
/// [[publisher.sources]]
/// id = "gps"
/// path = "data/gps.csv"
/// schema = ["float", "float"]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceEntry {
    /// Source id; `accel` and `gps` are required
    pub id: String,
    /// Path to the comma-separated file
    pub path: PathBuf,
    /// Column types, in order
    pub schema: Vec<ColumnType>,
}

impl SourceEntry {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>, schema: Vec<ColumnType>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            schema,
        }
    }
}

/// Publisher configuration
///
/// # Example
///
/// ```toml
/// [publisher]
/// channel_address = "127.0.0.1:1883"
/// topic = "agent_data/1"
/// interval = "500ms"
/// ack_timeout = "5s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Channel listener to publish to
    /// Default: 127.0.0.1:1883
    pub channel_address: String,

    /// Topic for every sample; its last segment is the agent id
    /// Default: agent_data/1
    pub topic: String,

    /// Delay between samples
    /// Default: 500ms
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// How long to wait for each acknowledgment
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub ack_timeout: Duration,

    /// Recorded feeds
    /// Default: data/accelerometer.csv (int x3) and data/gps.csv (float x2)
    pub sources: Vec<SourceEntry>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            channel_address: "127.0.0.1:1883".into(),
            topic: "agent_data/1".into(),
            interval: Duration::from_millis(500),
            ack_timeout: Duration::from_secs(5),
            sources: vec![
                SourceEntry::new("accel", "data/accelerometer.csv", vec![ColumnType::Int; 3]),
                SourceEntry::new("gps", "data/gps.csv", vec![ColumnType::Float; 2]),
            ],
        }
    }
}
