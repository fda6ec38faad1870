//! Source identification types
//!
//! `SourceId` names one recorded sensor feed (e.g. `accel`, `gps`).

use std::fmt;

/// Identifier of a recorded sensor feed
///
/// The reader looks feeds up by id to decide which columns become the
/// accelerometer axes and which become the GPS position.
///
/// # Example
///
/// ```
/// use roadpulse_protocol::SourceId;
///
/// let source = SourceId::new("accel");
/// assert_eq!(source.as_str(), "accel");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(String);

impl SourceId {
    /// Create a new source ID
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the source ID as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SourceId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
