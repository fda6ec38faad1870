//! Aggregate sensor sample
//!
//! One `AggregateSample` is produced per reader tick. It combines the current
//! accelerometer row and the current GPS row with the wall-clock capture time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Three-axis accelerometer reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Accelerometer {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Accelerometer {
    /// Create a new reading
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// GPS position
///
/// Field order on the wire is longitude first, matching the recorded files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gps {
    pub longitude: f64,
    pub latitude: f64,
}

impl Gps {
    /// Create a new position
    #[inline]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// One synchronized accelerometer + GPS sample
///
/// Immutable once produced: fields are private and only readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSample {
    accelerometer: Accelerometer,
    gps: Gps,
    #[serde(rename = "timestamp", with = "crate::timestamp")]
    captured_at: DateTime<Utc>,
}

impl AggregateSample {
    /// Create a sample captured at the given time
    pub fn new(accelerometer: Accelerometer, gps: Gps, captured_at: DateTime<Utc>) -> Self {
        Self {
            accelerometer,
            gps,
            captured_at,
        }
    }

    /// Create a sample stamped with the current wall-clock time
    pub fn now(accelerometer: Accelerometer, gps: Gps) -> Self {
        Self::new(accelerometer, gps, Utc::now())
    }

    #[inline]
    pub fn accelerometer(&self) -> Accelerometer {
        self.accelerometer
    }

    #[inline]
    pub fn gps(&self) -> Gps {
        self.gps
    }

    #[inline]
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}
