//! History port: Trait for the session prediction log.

use crate::domain::HistoryEntry;

/// Append-only log of successful predictions.
///
/// Entries are kept in submission order and never modified or removed.
pub trait HistoryLog {
    /// Record one successful prediction.
    fn append(&mut self, entry: HistoryEntry);

    /// All entries, oldest first.
    fn entries(&self) -> &[HistoryEntry];

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
