//! Snapshot push of the full record list to a user-configured webhook.
//!
//! Each push is a single POST of every record. The receiving end replaces
//! its stored copy wholesale, so there is no delta or merge. The response is
//! never read: a push counts as delivered once the request completes at the
//! transport level, whatever the HTTP status.

use crate::core::Observation;
use crate::display::DisplayZone;
use serde::{Deserialize, Serialize};

/// One row of the push payload. Date and time are display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRow {
    pub id: String,
    pub date: String,
    pub time: String,
    pub systolic: u32,
    pub diastolic: u32,
    pub pulse: u32,
    pub note: String,
}

/// Build the push payload, preserving the order of `records`.
pub fn build_payload(records: &[Observation], zone: DisplayZone) -> Vec<SyncRow> {
    records
        .iter()
        .map(|r| SyncRow {
            id: r.id.clone(),
            date: zone.format_date(r.timestamp),
            time: zone.format_time(r.timestamp),
            systolic: r.systolic,
            diastolic: r.diastolic,
            pulse: r.pulse,
            note: r.note_text().to_string(),
        })
        .collect()
}

/// Result of a push attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The request completed at the network layer
    Delivered,
    /// The request never completed (bad URL, DNS, refused, offline)
    Failed,
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncOutcome::Delivered => write!(f, "delivered"),
            SyncOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Sync setup errors.
#[derive(Debug)]
pub enum SyncError {
    /// The HTTP client could not be created
    Client(String),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Client(msg) => write!(f, "Sync client error: {msg}"),
        }
    }
}

impl std::error::Error for SyncError {}

/// Pushes record snapshots. One attempt per call, no retries.
#[cfg(feature = "sync")]
pub struct SyncDispatcher {
    client: reqwest::Client,
    zone: DisplayZone,
}

#[cfg(feature = "sync")]
impl SyncDispatcher {
    /// Create a dispatcher rendering dates in `zone`.
    pub fn new(zone: DisplayZone) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SyncError::Client(e.to_string()))?;

        Ok(Self { client, zone })
    }

    /// POST every record to `url`.
    pub async fn push(&self, url: &str, records: &[Observation]) -> SyncOutcome {
        let payload = build_payload(records, self.zone);
        let body = match serde_json::to_vec(&payload) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Could not encode sync payload: {}", e);
                return SyncOutcome::Failed;
            }
        };

        let result = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::info!("Pushed {} records to sync endpoint", records.len());
                SyncOutcome::Delivered
            }
            Err(e) => {
                tracing::error!("Sync push failed: {}", e);
                SyncOutcome::Failed
            }
        }
    }
}

/// Spreadsheet-side receiver to install as a web app. It clears the sheet and
/// rewrites every row on each push.
pub fn receiver_script() -> &'static str {
    RECEIVER_SCRIPT
}

const RECEIVER_SCRIPT: &str = r#"/*
   1. Open Extensions > Apps Script in your Google Sheet
   2. Paste this code
   3. Deploy > New deployment > Web app
   4. Execute as: "Me"
   5. Who has access: "Anyone" (the tracker posts without credentials)
   6. Deploy and copy the Web App URL into `cardiotrack settings --sync-url`
*/

function doPost(e) {
  try {
    var sheet = SpreadsheetApp.getActiveSpreadsheet().getActiveSheet();
    var data = JSON.parse(e.postData.contents);

    // Every push is a full snapshot: replace the whole sheet.
    sheet.clear();
    sheet.appendRow(['ID', 'Date', 'Time', 'Systolic', 'Diastolic', 'Pulse', 'Note']);

    // Rows arrive newest first.
    data.forEach(function(r) {
      sheet.appendRow([r.id, r.date, r.time, r.systolic, r.diastolic, r.pulse, r.note]);
    });

    return ContentService.createTextOutput(JSON.stringify({status: 'success'}))
      .setMimeType(ContentService.MimeType.JSON);
  } catch (err) {
    return ContentService.createTextOutput(JSON.stringify({status: 'error', message: err.toString()}))
      .setMimeType(ContentService.MimeType.JSON);
  }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_payload_rows() {
        let zone = DisplayZone::Named(chrono_tz::UTC);
        let ts = Utc
            .with_ymd_and_hms(2025, 1, 2, 15, 30, 0)
            .unwrap()
            .timestamp_millis();
        let records = vec![
            Observation::new(135, 88, 74, ts, Some("evening".to_string())),
            Observation::new(118, 76, 62, ts, None),
        ];

        let rows = build_payload(&records, zone);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, records[0].id);
        assert_eq!(rows[0].date, "1/2/2025");
        assert_eq!(rows[0].time, "3:30:00 PM");
        assert_eq!(rows[0].note, "evening");
        assert_eq!(rows[1].note, "");

        let json = serde_json::to_value(&rows[1]).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["date", "diastolic", "id", "note", "pulse", "systolic", "time"]
        );
    }

    #[test]
    fn test_receiver_script_overwrites() {
        let script = receiver_script();
        assert!(script.contains("function doPost"));
        assert!(script.contains("sheet.clear()"));
    }
}
