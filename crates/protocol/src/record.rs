//! Inbound agent data and persisted records
//!
//! `ProcessedAgentData` is what producers submit: a sample attributed to an
//! agent plus the road state it was classified as. `PersistedRecord` is the
//! same data after the store has assigned it an id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sample::{Accelerometer, AggregateSample, Gps};

/// Agent (vehicle / user) identifier
pub type AgentId = i64;

/// Sample attributed to an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentData {
    #[serde(alias = "user_id")]
    pub agent_id: AgentId,
    pub accelerometer: Accelerometer,
    pub gps: Gps,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl AgentData {
    /// Attribute an aggregate sample to an agent
    pub fn from_sample(agent_id: AgentId, sample: &AggregateSample) -> Self {
        Self {
            agent_id,
            accelerometer: sample.accelerometer(),
            gps: sample.gps(),
            timestamp: sample.captured_at(),
        }
    }
}

/// Inbound sample with its road-state classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedAgentData {
    pub road_state: String,
    pub agent_data: AgentData,
}

/// Record ready to be inserted; the store assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub agent_id: AgentId,
    pub road_state: String,
    pub accelerometer: Accelerometer,
    pub gps: Gps,
    pub timestamp: DateTime<Utc>,
}

impl NewRecord {
    /// Attach an id, producing the persisted form
    pub fn with_id(self, id: i64) -> PersistedRecord {
        PersistedRecord {
            id,
            agent_id: self.agent_id,
            road_state: self.road_state,
            accelerometer: self.accelerometer,
            gps: self.gps,
            timestamp: self.timestamp,
        }
    }
}

impl From<ProcessedAgentData> for NewRecord {
    fn from(data: ProcessedAgentData) -> Self {
        Self {
            agent_id: data.agent_data.agent_id,
            road_state: data.road_state,
            accelerometer: data.agent_data.accelerometer,
            gps: data.agent_data.gps,
            timestamp: data.agent_data.timestamp,
        }
    }
}

/// Stored sample with its server-assigned id
///
/// This is also the view pushed to live observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub id: i64,
    pub agent_id: AgentId,
    pub road_state: String,
    pub accelerometer: Accelerometer,
    pub gps: Gps,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}
