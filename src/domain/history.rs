//! Session history entries.

use serde::{Deserialize, Serialize};

use super::patient::PatientRecord;

/// One successful prediction, as recorded in the session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the prediction was made
    pub recorded_at: chrono::DateTime<chrono::Utc>,

    /// Validated input that produced the prediction
    pub record: PatientRecord,

    /// Decoded class name
    pub predicted_label: String,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time.
    #[must_use]
    pub fn new(record: PatientRecord, predicted_label: impl Into<String>) -> Self {
        Self {
            recorded_at: chrono::Utc::now(),
            record,
            predicted_label: predicted_label.into(),
        }
    }
}
