//! Roadpulse Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use roadpulse_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[server]\ndatabase = \"memory\"").unwrap();
//! assert_eq!(config.server.database, "memory");
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [publisher]
//! channel_address = "127.0.0.1:1883"
//! topic = "agent_data/1"
//! interval = "500ms"
//!
//! [[publisher.sources]]
//! id = "accel"
//! path = "data/accelerometer.csv"
//! schema = ["int", "int", "int"]
//!
//! [[publisher.sources]]
//! id = "gps"
//! path = "data/gps.csv"
//! schema = ["float", "float"]
//!
//! [server]
//! http_address = "0.0.0.0:8000"
//! channel_address = "0.0.0.0:1883"
//! database = "data/roadpulse.db"
//! ```
//!
//! See `configs/config.toml` for all available options.

mod error;
mod logging;
mod publisher;
mod server;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use publisher::{ColumnType, PublisherConfig, SourceEntry};
pub use server::ServerConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Replay publisher (`roadpulse publish`)
    pub publisher: PublisherConfig,

    /// Ingestion server (`roadpulse serve`)
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
