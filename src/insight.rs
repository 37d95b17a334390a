//! Advisory narrative summaries from a generative text service.
//!
//! Only the 20 most recent readings are sent. Replies are free text shown
//! beside the charts and never feed back into the records or analytics.

use crate::core::Observation;
use crate::display::DisplayZone;
use serde::Deserialize;

/// Most recent readings included in a request.
pub const MAX_INSIGHT_RECORDS: usize = 20;

/// Reply when there is nothing to analyse.
pub const NO_DATA_MESSAGE: &str = "No data available to analyze.";

/// Reply when the service answers with no text.
pub const EMPTY_REPLY_MESSAGE: &str = "Could not generate analysis.";

/// Reply when the request fails.
pub const FAILURE_MESSAGE: &str =
    "Unable to analyze trends at this moment. Please check your internet connection.";

const SYSTEM_INSTRUCTION: &str = "You are a professional medical assistant. Be concise, friendly, \
and cautious. Do not provide medical diagnosis, only observations.";

const ANALYSIS_INSTRUCTION: &str = "You are a supportive cardiovascular health assistant.
Analyze the following blood pressure and heart rate readings.
Identify any trends (rising, falling, stable).
Check if the values are generally within normal, elevated, or hypertensive ranges (based on standard guidelines).
Provide a concise, encouraging summary (max 3 sentences) and 1 specific actionable health tip.";

/// One line per reading, newest first, at most [`MAX_INSIGHT_RECORDS`].
pub fn summarize(records: &[Observation], zone: DisplayZone) -> String {
    records
        .iter()
        .take(MAX_INSIGHT_RECORDS)
        .map(|r| {
            format!(
                "Date: {}, BP: {}/{}, Pulse: {}",
                zone.format_date(r.timestamp),
                r.systolic,
                r.diastolic,
                r.pulse
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The full prompt sent for `records`.
pub fn build_prompt(records: &[Observation], zone: DisplayZone) -> String {
    format!(
        "{ANALYSIS_INSTRUCTION}\n\nData:\n{}",
        summarize(records, zone)
    )
}

/// Insight request errors.
#[derive(Debug)]
pub enum InsightError {
    /// The API key environment variable is not set
    MissingApiKey(String),
    /// Network/HTTP error
    Network(String),
    /// Service returned an error response
    Server { status: u16, message: String },
    /// The reply could not be decoded
    Parse(String),
}

impl std::fmt::Display for InsightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightError::MissingApiKey(var) => write!(f, "Insight API key not set (${var})"),
            InsightError::Network(msg) => write!(f, "Insight network error: {msg}"),
            InsightError::Server { status, message } => {
                write!(f, "Insight service error ({status}): {message}")
            }
            InsightError::Parse(msg) => write!(f, "Insight response error: {msg}"),
        }
    }
}

impl std::error::Error for InsightError {}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Client for the generative text endpoint.
#[cfg(feature = "insight")]
pub struct InsightClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    zone: DisplayZone,
}

#[cfg(feature = "insight")]
impl InsightClient {
    /// Create a client with an explicit API key.
    pub fn new(
        config: &crate::config::InsightConfig,
        api_key: impl Into<String>,
        zone: DisplayZone,
    ) -> Result<Self, InsightError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| InsightError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            zone,
        })
    }

    /// Create a client reading the API key from the configured environment variable.
    pub fn from_env(
        config: &crate::config::InsightConfig,
        zone: DisplayZone,
    ) -> Result<Self, InsightError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| InsightError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key, zone)
    }

    /// URL of the text generation call.
    pub fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Request a narrative for `records`.
    ///
    /// An empty list short-circuits to [`NO_DATA_MESSAGE`] without a request.
    /// An empty reply yields [`EMPTY_REPLY_MESSAGE`].
    pub async fn request(&self, records: &[Observation]) -> Result<String, InsightError> {
        if records.is_empty() {
            return Ok(NO_DATA_MESSAGE.to_string());
        }

        let body = serde_json::json!({
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "contents": [{ "parts": [{ "text": build_prompt(records, self.zone) }] }],
        });

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| InsightError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InsightError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| InsightError::Parse(e.to_string()))?;

        let text = reply.text();
        if text.trim().is_empty() {
            Ok(EMPTY_REPLY_MESSAGE.to_string())
        } else {
            Ok(text)
        }
    }

    /// Like [`request`](Self::request), but any failure becomes
    /// [`FAILURE_MESSAGE`].
    pub async fn analyze_trends(&self, records: &[Observation]) -> String {
        match self.request(records).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Insight request failed: {}", e);
                FAILURE_MESSAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> DisplayZone {
        DisplayZone::Named(chrono_tz::UTC)
    }

    #[test]
    fn test_summary_is_bounded() {
        let records: Vec<Observation> = (0..25)
            .map(|i| Observation::new(120 + i, 80, 70, 0, None))
            .collect();
        let summary = summarize(&records, utc());
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines.len(), MAX_INSIGHT_RECORDS);
        assert_eq!(lines[0], "Date: 1/1/1970, BP: 120/80, Pulse: 70");
        assert_eq!(lines[19], "Date: 1/1/1970, BP: 139/80, Pulse: 70");
    }

    #[test]
    fn test_prompt_contains_data() {
        let records = vec![Observation::new(142, 91, 80, 0, None)];
        let prompt = build_prompt(&records, utc());
        assert!(prompt.starts_with("You are a supportive cardiovascular health assistant."));
        assert!(prompt.ends_with("Data:\nDate: 1/1/1970, BP: 142/91, Pulse: 80"));
    }

    #[test]
    fn test_reply_text_extraction() {
        let reply: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Stable. "},{"text":"Keep walking."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(reply.text(), "Stable. Keep walking.");

        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), "");
    }
}
