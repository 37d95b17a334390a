//! User settings: the sync endpoint and the last successful sync time.

use crate::store::blob::BlobStore;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};

/// Blob key holding the settings.
pub const SETTINGS_KEY: &str = "cardiotrack_settings_v1";

/// Application settings. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Webhook that receives full snapshot pushes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_sheet_url: Option<String>,
    /// Epoch milliseconds of the last delivered sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_time: Option<i64>,
}

impl Settings {
    /// Overlay the fields present in `partial`; absent fields keep their
    /// current value.
    pub fn merged(self, partial: Settings) -> Settings {
        Settings {
            google_sheet_url: partial.google_sheet_url.or(self.google_sheet_url),
            last_sync_time: partial.last_sync_time.or(self.last_sync_time),
        }
    }

    /// The configured endpoint, treating a blank value as unset.
    pub fn sync_endpoint(&self) -> Option<&str> {
        self.google_sheet_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

pub struct SettingsStore<B> {
    blobs: B,
}

impl<B: BlobStore> SettingsStore<B> {
    pub fn new(blobs: B) -> Self {
        Self { blobs }
    }

    /// Current settings. Missing or corrupt data yields empty settings.
    pub fn get(&self) -> Settings {
        match self.blobs.read(SETTINGS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Stored settings are corrupt, using defaults: {}", e);
                Settings::default()
            }),
            Ok(None) => Settings::default(),
            Err(e) => {
                tracing::warn!("Could not read stored settings, using defaults: {}", e);
                Settings::default()
            }
        }
    }

    /// Merge `partial` over the stored settings, persist, and return the result.
    pub fn save(&self, partial: Settings) -> Result<Settings, StoreError> {
        let updated = self.get().merged(partial);
        let json = serde_json::to_string(&updated).map_err(StoreError::Serialize)?;
        self.blobs
            .write(SETTINGS_KEY, &json)
            .map_err(StoreError::Io)?;
        Ok(updated)
    }
}
