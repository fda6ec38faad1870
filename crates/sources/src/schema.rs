//! Row schemas
//!
//! A `RowSchema` is an ordered list of field types. Applying it to one line
//! of a recorded file yields either a typed `Row` or a `SourceParseError`.

use crate::error::SourceParseError;

/// Column type in a recorded file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Signed integer
    Int,
    /// Floating point number
    Float,
}

impl FieldType {
    /// Human-readable name used in parse errors
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
        }
    }

    /// Parse one raw column
    pub fn parse(&self, column: usize, raw: &str) -> Result<Field, SourceParseError> {
        let raw = raw.trim();
        let parsed = match self {
            Self::Int => raw.parse::<i64>().ok().map(Field::Int),
            Self::Float => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Field::Float),
        };

        parsed.ok_or_else(|| SourceParseError::InvalidField {
            column,
            value: raw.to_string(),
            expected: self.as_str(),
        })
    }
}

/// One typed column value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    Int(i64),
    Float(f64),
}

impl Field {
    /// Numeric value as f64
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

/// One typed row
pub type Row = Vec<Field>;

/// Ordered list of column types for one feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSchema {
    fields: Vec<FieldType>,
}

impl RowSchema {
    /// Create a schema from column types
    pub fn new(fields: Vec<FieldType>) -> Self {
        Self { fields }
    }

    /// Create a schema of `count` columns of the same type
    pub fn uniform(field: FieldType, count: usize) -> Self {
        Self::new(vec![field; count])
    }

    /// Number of columns
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse one comma-separated line
    pub fn parse_line(&self, line: &str) -> Result<Row, SourceParseError> {
        let columns: Vec<&str> = line.split(',').collect();
        if columns.len() != self.fields.len() {
            return Err(SourceParseError::ColumnCount {
                expected: self.fields.len(),
                actual: columns.len(),
            });
        }

        self.fields
            .iter()
            .zip(columns)
            .enumerate()
            .map(|(column, (field, raw))| field.parse(column, raw))
            .collect()
    }
}
