//! Source error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use roadpulse_protocol::SourceId;

/// Errors that make a reader unusable
#[derive(Debug, Error)]
pub enum SourceError {
    /// Recorded file could not be read
    #[error("failed to read source '{source_id}' from '{path}': {error}")]
    Io {
        source_id: SourceId,
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    /// A required feed has no usable rows
    #[error("source '{0}' has no usable rows")]
    EmptySource(SourceId),

    /// A required feed was never declared
    #[error("required source '{0}' is not configured")]
    MissingSource(SourceId),

    /// A feed's schema has fewer columns than the sample needs
    #[error("source '{source_id}' needs at least {expected} columns, schema has {actual}")]
    SchemaMismatch {
        source_id: SourceId,
        expected: usize,
        actual: usize,
    },
}

impl SourceError {
    /// Create an empty source error
    pub fn empty(source_id: impl Into<SourceId>) -> Self {
        Self::EmptySource(source_id.into())
    }

    /// Create a missing source error
    pub fn missing(source_id: impl Into<SourceId>) -> Self {
        Self::MissingSource(source_id.into())
    }
}

/// A single malformed line; recovered by skipping it
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceParseError {
    /// Line has a different number of columns than the schema
    #[error("expected {expected} columns, found {actual}")]
    ColumnCount { expected: usize, actual: usize },

    /// A column does not coerce to its declared type
    #[error("column {column}: cannot parse '{value}' as {expected}")]
    InvalidField {
        column: usize,
        value: String,
        expected: &'static str,
    },
}

/// Result type for source operations
pub type Result<T> = std::result::Result<T, SourceError>;
