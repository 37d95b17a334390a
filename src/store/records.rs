//! The canonical, persisted list of observations.
//!
//! Every mutation reads the whole list, modifies it and writes the whole list
//! back. The list is newest-first by insertion: whatever was added last is at
//! index 0, regardless of the timestamp the user picked for it.

use crate::core::Observation;
use crate::store::blob::BlobStore;
use crate::store::StoreError;

/// Blob key holding the record list.
pub const RECORDS_KEY: &str = "cardiotrack_data_v1";

pub struct RecordStore<B> {
    blobs: B,
}

impl<B: BlobStore> RecordStore<B> {
    pub fn new(blobs: B) -> Self {
        Self { blobs }
    }

    /// The canonical list, newest first.
    ///
    /// A missing or unreadable blob yields an empty list.
    pub fn list(&self) -> Vec<Observation> {
        let raw = match self.blobs.read(RECORDS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Could not read stored records, starting empty: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Stored records are corrupt, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Prepend a reading and persist. Returns the new canonical list.
    ///
    /// The caller generates the id. An id already present is rejected and
    /// nothing is written.
    pub fn add(&self, observation: Observation) -> Result<Vec<Observation>, StoreError> {
        let mut records = self.list();
        if records.iter().any(|r| r.id == observation.id) {
            return Err(StoreError::DuplicateId(observation.id));
        }

        tracing::debug!(id = %observation.id, "Adding reading");
        records.insert(0, observation);
        self.persist(&records)?;
        Ok(records)
    }

    /// Remove the reading with `id`, if any, and persist. Returns the new
    /// canonical list. Deleting an unknown id is not an error.
    pub fn delete(&self, id: &str) -> Result<Vec<Observation>, StoreError> {
        let mut records = self.list();
        let before = records.len();
        records.retain(|r| r.id != id);

        if records.len() == before {
            tracing::debug!(id, "Delete requested for unknown reading");
        } else {
            tracing::debug!(id, "Deleted reading");
        }

        self.persist(&records)?;
        Ok(records)
    }

    fn persist(&self, records: &[Observation]) -> Result<(), StoreError> {
        let json = serde_json::to_string(records).map_err(StoreError::Serialize)?;
        self.blobs.write(RECORDS_KEY, &json).map_err(StoreError::Io)
    }
}
