//! Bounded audit surface.
//!
//! Every processed event appends one row; only the most recent rows are
//! kept (default 20), oldest dropped first. The log is append-only from
//! the caller's point of view and observable independently of the tree.

use serde::Serialize;
use std::collections::VecDeque;

/// Default number of visible rows.
pub const DEFAULT_VISIBLE_ROWS: usize = 20;

/// One audit entry for a processed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRow {
    /// Opaque timestamp copied from the event.
    pub time: String,
    /// Stage grouping, e.g. `component`, `finish`.
    pub category: String,
    /// Stage tag of the processed event.
    pub action: String,
    /// Persistent report id, `None` when the event only carried a temp
    /// id (rendered as "-" by displays).
    pub report_id: Option<String>,
    /// Outcome summary: op count, "no-op", or the diagnostic text.
    pub context: String,
}

/// Fixed-capacity row ring; pushing past capacity evicts the oldest row.
#[derive(Debug, Clone)]
pub struct AuditLog {
    max: usize,
    rows: VecDeque<AuditRow>,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_VISIBLE_ROWS)
    }

    pub fn with_capacity(max: usize) -> Self {
        Self {
            max: max.max(1),
            rows: VecDeque::with_capacity(max.max(1)),
        }
    }

    pub fn push(&mut self, row: AuditRow) {
        if self.rows.len() == self.max {
            self.rows.pop_front();
        }
        self.rows.push_back(row);
    }

    /// Visible rows, oldest first.
    pub fn rows(&self) -> impl Iterator<Item = &AuditRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
