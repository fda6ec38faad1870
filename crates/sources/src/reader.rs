//! Synchronized multi-stream reader
//!
//! `MultiStreamReader` owns one `SourceStream` per recorded feed and turns
//! their current rows into one `AggregateSample` per `next()` call.
//!
//! Every call advances every stream by one row, each wrapping at its own
//! length. Two feeds of different length therefore stay out of step in
//! absolute time after the shorter one wraps; replay reproduces the files'
//! cycles exactly rather than re-aligning them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use roadpulse_protocol::{Accelerometer, AggregateSample, Gps, SourceId};

use crate::error::{Result, SourceError};
use crate::schema::{Row, RowSchema};
use crate::stream::SourceStream;

/// Feed whose first three columns are the accelerometer x, y, z
pub const ACCEL_SOURCE: &str = "accel";

/// Feed whose first two columns are GPS longitude, latitude
pub const GPS_SOURCE: &str = "gps";

const ACCEL_COLUMNS: usize = 3;
const GPS_COLUMNS: usize = 2;

/// Declaration of one recorded feed
#[derive(Debug, Clone)]
pub struct SourceSpec {
    /// Feed identifier
    pub id: SourceId,
    /// Path to the recorded file
    pub path: PathBuf,
    /// Column types
    pub schema: RowSchema,
}

impl SourceSpec {
    pub fn new(id: impl Into<SourceId>, path: impl AsRef<Path>, schema: RowSchema) -> Self {
        Self {
            id: id.into(),
            path: path.as_ref().to_path_buf(),
            schema,
        }
    }
}

/// Outcome of loading one feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub source_id: SourceId,
    pub rows_loaded: usize,
    pub rows_skipped: usize,
}

/// Replays recorded feeds as synchronized aggregate samples
#[derive(Debug, Default)]
pub struct MultiStreamReader {
    streams: Vec<SourceStream>,
    reports: Vec<LoadReport>,
}

impl MultiStreamReader {
    /// Build a reader from already-loaded streams
    ///
    /// No validation is done here; `next()` reports missing or empty feeds.
    pub fn new(streams: Vec<SourceStream>) -> Self {
        Self {
            streams,
            reports: Vec::new(),
        }
    }

    /// Load every declared feed and check the required ones are usable
    ///
    /// # Errors
    ///
    /// Returns `Io` if a file cannot be read, `MissingSource` or
    /// `SchemaMismatch` if `accel`/`gps` are undeclared or too narrow, and
    /// `EmptySource` if either has no usable rows.
    pub fn open(specs: Vec<SourceSpec>) -> Result<Self> {
        require_columns(&specs, ACCEL_SOURCE, ACCEL_COLUMNS)?;
        require_columns(&specs, GPS_SOURCE, GPS_COLUMNS)?;

        let mut streams = Vec::with_capacity(specs.len());
        let mut reports = Vec::with_capacity(specs.len());

        for spec in specs {
            let (stream, report) = load_stream(spec)?;
            info!(
                source = %report.source_id,
                rows = report.rows_loaded,
                skipped = report.rows_skipped,
                "loaded source"
            );
            streams.push(stream);
            reports.push(report);
        }

        let reader = Self { streams, reports };
        reader.ensure_ready()?;
        Ok(reader)
    }

    /// Check that both required feeds exist and have rows
    pub fn ensure_ready(&self) -> Result<()> {
        for id in [ACCEL_SOURCE, GPS_SOURCE] {
            let stream = self.stream(id).ok_or_else(|| SourceError::missing(id))?;
            if stream.is_empty() {
                return Err(SourceError::empty(id));
            }
        }
        Ok(())
    }

    /// Produce the next aggregate sample and advance every feed
    ///
    /// The sample is stamped with the current wall-clock time; recorded
    /// times in the files are not used.
    ///
    /// # Errors
    ///
    /// Returns `EmptySource` if `accel` or `gps` has no rows; cursors are
    /// left untouched in that case.
    pub fn next(&mut self) -> Result<AggregateSample> {
        let accel_row = self.current_row(ACCEL_SOURCE)?;
        let gps_row = self.current_row(GPS_SOURCE)?;

        let accelerometer = Accelerometer::new(
            column(accel_row, ACCEL_SOURCE, 0, ACCEL_COLUMNS)?,
            column(accel_row, ACCEL_SOURCE, 1, ACCEL_COLUMNS)?,
            column(accel_row, ACCEL_SOURCE, 2, ACCEL_COLUMNS)?,
        );
        let gps = Gps::new(
            column(gps_row, GPS_SOURCE, 0, GPS_COLUMNS)?,
            column(gps_row, GPS_SOURCE, 1, GPS_COLUMNS)?,
        );

        for stream in &mut self.streams {
            stream.advance();
        }

        Ok(AggregateSample::now(accelerometer, gps))
    }

    /// Teardown: rewind every feed and drop buffered rows
    pub fn stop(&mut self) {
        for stream in &mut self.streams {
            stream.clear();
        }
        debug!(sources = self.streams.len(), "reader stopped");
    }

    /// Cursor of a feed, `None` if it is not loaded
    pub fn cursor(&self, id: &str) -> Option<usize> {
        self.stream(id).map(SourceStream::cursor)
    }

    /// Row count of a feed, `None` if it is not loaded
    pub fn len(&self, id: &str) -> Option<usize> {
        self.stream(id).map(SourceStream::len)
    }

    /// Whether no feeds are loaded
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Loaded feed ids in declaration order
    pub fn source_ids(&self) -> impl Iterator<Item = &SourceId> {
        self.streams.iter().map(SourceStream::id)
    }

    /// Per-feed load outcome (empty for readers built with `new`)
    pub fn load_reports(&self) -> &[LoadReport] {
        &self.reports
    }

    fn stream(&self, id: &str) -> Option<&SourceStream> {
        self.streams.iter().find(|s| s.id() == id)
    }

    fn current_row(&self, id: &str) -> Result<&Row> {
        let stream = self.stream(id).ok_or_else(|| SourceError::missing(id))?;
        stream.current().ok_or_else(|| SourceError::empty(id))
    }
}

fn require_columns(specs: &[SourceSpec], id: &str, expected: usize) -> Result<()> {
    let spec = specs
        .iter()
        .find(|s| s.id == *id)
        .ok_or_else(|| SourceError::missing(id))?;

    if spec.schema.len() < expected {
        return Err(SourceError::SchemaMismatch {
            source_id: spec.id.clone(),
            expected,
            actual: spec.schema.len(),
        });
    }
    Ok(())
}

fn column(row: &Row, id: &str, index: usize, expected: usize) -> Result<f64> {
    row.get(index)
        .map(|field| field.as_f64())
        .ok_or_else(|| SourceError::SchemaMismatch {
            source_id: SourceId::new(id),
            expected,
            actual: row.len(),
        })
}

/// Read a whole file, keeping rows that match the schema
fn load_stream(spec: SourceSpec) -> Result<(SourceStream, LoadReport)> {
    let contents = fs::read_to_string(&spec.path).map_err(|error| SourceError::Io {
        source_id: spec.id.clone(),
        path: spec.path.clone(),
        error,
    })?;

    let mut rows = Vec::new();
    let mut skipped = 0;

    for (line_no, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match spec.schema.parse_line(line) {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                debug!(source = %spec.id, line = line_no + 1, error = %e, "skipping malformed row");
            }
        }
    }

    if skipped > 0 {
        warn!(source = %spec.id, skipped, "skipped malformed rows");
    }

    let report = LoadReport {
        source_id: spec.id.clone(),
        rows_loaded: rows.len(),
        rows_skipped: skipped,
    };

    Ok((SourceStream::new(spec.id, rows), report))
}
