//! Configuration validation
//!
//! - Publisher source ids are unique
//! - `accel` and `gps` are declared with enough columns
//! - Addresses, topic and database are non-empty
//! - Observer queues hold at least one record

use std::collections::HashSet;

use crate::Config;
use crate::error::{ConfigError, Result};

/// Sources the reader cannot run without, with their minimum column count
const REQUIRED_SOURCES: &[(&str, usize)] = &[("accel", 3), ("gps", 2)];

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_publisher(config)?;
    validate_server(config)?;
    Ok(())
}

fn validate_publisher(config: &Config) -> Result<()> {
    let publisher = &config.publisher;

    if publisher.channel_address.trim().is_empty() {
        return Err(ConfigError::missing_field("publisher", "channel", "channel_address"));
    }
    if publisher.topic.trim().is_empty() {
        return Err(ConfigError::missing_field("publisher", "channel", "topic"));
    }
    if publisher.interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "publisher",
            "channel",
            "interval",
            "must be greater than zero",
        ));
    }
    if publisher.ack_timeout.is_zero() {
        return Err(ConfigError::invalid_value(
            "publisher",
            "channel",
            "ack_timeout",
            "must be greater than zero",
        ));
    }

    let mut seen = HashSet::new();
    for source in &publisher.sources {
        if !seen.insert(source.id.as_str()) {
            return Err(ConfigError::duplicate_source(&source.id));
        }
        if source.schema.is_empty() {
            return Err(ConfigError::missing_field("publisher", &source.id, "schema"));
        }
    }

    for &(id, columns) in REQUIRED_SOURCES {
        let Some(source) = publisher.sources.iter().find(|s| s.id == id) else {
            return Err(ConfigError::missing_source(id));
        };
        if source.schema.len() < columns {
            return Err(ConfigError::invalid_value(
                "publisher",
                id,
                "schema",
                format!("needs at least {columns} columns, has {}", source.schema.len()),
            ));
        }
    }

    Ok(())
}

fn validate_server(config: &Config) -> Result<()> {
    let server = &config.server;

    if server.http_address.trim().is_empty() {
        return Err(ConfigError::missing_field("server", "http", "http_address"));
    }
    if server.channel_address.trim().is_empty() {
        return Err(ConfigError::missing_field("server", "channel", "channel_address"));
    }
    if server.database.trim().is_empty() {
        return Err(ConfigError::missing_field("server", "store", "database"));
    }
    if server.observer_queue == 0 {
        return Err(ConfigError::invalid_value(
            "server",
            "observers",
            "observer_queue",
            "must hold at least one record",
        ));
    }

    Ok(())
}
