//! A single recorded sensor feed with its replay cursor

use crate::schema::Row;
use roadpulse_protocol::SourceId;

/// One recorded feed: fixed rows plus a cursor
///
/// Invariant: `cursor < rows.len()` whenever `rows` is non-empty.
#[derive(Debug, Clone)]
pub struct SourceStream {
    id: SourceId,
    rows: Vec<Row>,
    cursor: usize,
}

impl SourceStream {
    /// Create a stream positioned at its first row
    pub fn new(id: impl Into<SourceId>, rows: Vec<Row>) -> Self {
        Self {
            id: id.into(),
            rows,
            cursor: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> &SourceId {
        &self.id
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at the cursor, `None` when the stream is empty
    #[inline]
    pub fn current(&self) -> Option<&Row> {
        self.rows.get(self.cursor)
    }

    /// Move to the next row, wrapping to 0 at the end
    pub fn advance(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.cursor = (self.cursor + 1) % self.rows.len();
    }

    /// Drop buffered rows and rewind
    pub fn clear(&mut self) {
        self.rows.clear();
        self.cursor = 0;
    }
}
