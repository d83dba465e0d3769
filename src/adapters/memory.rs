//! In-memory session history.
//!
//! History lives for the length of one application session and is never
//! persisted.

use crate::domain::HistoryEntry;
use crate::ports::HistoryLog;

/// Append-only, session-scoped prediction history.
#[derive(Debug, Default, Clone)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
}

impl SessionHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryLog for SessionHistory {
    fn append(&mut self, entry: HistoryEntry) {
        tracing::debug!("History entry #{} recorded", self.entries.len() + 1);
        self.entries.push(entry);
    }

    fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}
