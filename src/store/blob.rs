//! Keyed text-blob persistence.
//!
//! The record list and the settings each live under their own key. The
//! stores built on top treat a blob as opaque text.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A keyed store of text blobs.
pub trait BlobStore {
    /// Read the blob stored under `key`, or `None` if it has never been written.
    fn read(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the blob stored under `key`.
    fn write(&self, key: &str, contents: &str) -> io::Result<()>;
}

/// One file per key inside a directory.
///
/// Writes go to a temporary sibling that is then renamed over the target,
/// so a reader never sees a half-written blob.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, contents: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let target = self.path_for(key);
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&staging, contents)?;
        std::fs::rename(&staging, &target)
    }
}

/// In-memory store. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn blobs(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.blobs().get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> io::Result<()> {
        self.blobs().insert(key.to_string(), contents.to_string());
        Ok(())
    }
}
