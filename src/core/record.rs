//! The observation record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One blood-pressure and pulse reading.
///
/// Records are immutable once created. Two readings with identical values
/// are still distinct records; only `id` carries identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Opaque identifier, unique across the store
    pub id: String,
    /// Systolic pressure in mmHg
    pub systolic: u32,
    /// Diastolic pressure in mmHg
    pub diastolic: u32,
    /// Heart rate in beats per minute
    pub pulse: u32,
    /// When the reading was taken, epoch milliseconds
    pub timestamp: i64,
    /// Free-form note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Observation {
    /// Create a reading with a freshly generated v4 UUID.
    pub fn new(
        systolic: u32,
        diastolic: u32,
        pulse: u32,
        timestamp: i64,
        note: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            systolic,
            diastolic,
            pulse,
            timestamp,
            note,
        }
    }

    /// The reading instant, if the timestamp is within chrono's range.
    pub fn taken_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp)
    }

    /// The note, or `""` when absent.
    pub fn note_text(&self) -> &str {
        self.note.as_deref().unwrap_or("")
    }
}
