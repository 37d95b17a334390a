//! Local persistence for records and settings.
//!
//! Both stores sit on a [`BlobStore`] and share its keyspace under distinct
//! keys. Reads are fail-soft; only writes can fail.

pub mod blob;
pub mod records;
pub mod settings;

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use records::{RecordStore, RECORDS_KEY};
pub use settings::{Settings, SettingsStore, SETTINGS_KEY};

/// Store write errors.
#[derive(Debug)]
pub enum StoreError {
    /// The blob could not be written
    Io(std::io::Error),
    /// The value could not be serialized
    Serialize(serde_json::Error),
    /// A record with this id already exists
    DuplicateId(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "Store write error: {e}"),
            StoreError::Serialize(e) => write!(f, "Store serialize error: {e}"),
            StoreError::DuplicateId(id) => write!(f, "A reading with id {id} already exists"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Serialize(e) => Some(e),
            StoreError::DuplicateId(_) => None,
        }
    }
}
