//! Roadpulse Sources - recorded sensor feeds
//!
//! Loads recorded sensor files into memory and replays them as synchronized
//! `AggregateSample`s, one per tick.
//!
//! # Design Principles
//!
//! - **Load once**: every file is read fully at construction, no open handles
//! - **Typed rows**: each feed declares a `RowSchema`; each line yields a
//!   `Result<Row, SourceParseError>` and failures are skipped, not fatal
//! - **Independent cursors**: each `SourceStream` owns its rows and cursor and
//!   wraps at its own length, so feeds of different lengths drift apart
//!   across wrap boundaries
//!
//! # Example
//!
//! ```ignore
//! use roadpulse_sources::{FieldType, MultiStreamReader, RowSchema, SourceSpec};
//!
//! let mut reader = MultiStreamReader::open(vec![
//!     SourceSpec::new("accel", "data/accelerometer.csv", RowSchema::uniform(FieldType::Int, 3)),
//!     SourceSpec::new("gps", "data/gps.csv", RowSchema::uniform(FieldType::Float, 2)),
//! ])?;
//!
//! let sample = reader.next()?;
//! ```

mod error;
mod reader;
mod schema;
mod stream;

pub use error::{Result, SourceError, SourceParseError};
pub use reader::{ACCEL_SOURCE, GPS_SOURCE, LoadReport, MultiStreamReader, SourceSpec};
pub use schema::{Field, FieldType, Row, RowSchema};
pub use stream::SourceStream;

pub use roadpulse_protocol::SourceId;
