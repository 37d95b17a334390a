//! CSV and JSON encoding of the record list.

use crate::core::Observation;
use crate::display::DisplayZone;
use chrono::NaiveDate;

/// Header row of a CSV export.
pub const CSV_HEADER: &str = "Date,Time,Systolic (mmHg),Diastolic (mmHg),Pulse (bpm),Note";

/// Export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format '{other}' (expected csv or json)")),
        }
    }
}

/// Encode records as CSV, one row per record in the order given.
///
/// The note cell is always wrapped in double quotes, even when empty. Quotes
/// inside a note are written as-is and not doubled, so a note containing `"`
/// produces a cell strict CSV readers will reject. Commas inside a note stay
/// inside the quoted cell.
pub fn to_csv(records: &[Observation], zone: DisplayZone) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for record in records {
        lines.push(format!(
            "{},{},{},{},{},\"{}\"",
            zone.format_date(record.timestamp),
            zone.format_time(record.timestamp),
            record.systolic,
            record.diastolic,
            record.pulse,
            record.note_text()
        ));
    }

    lines.join("\n")
}

/// Encode records as pretty-printed JSON.
pub fn to_json(records: &[Observation]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

/// Decode records previously written by [`to_json`].
pub fn from_json(json: &str) -> serde_json::Result<Vec<Observation>> {
    serde_json::from_str(json)
}

/// Download file name, e.g. `cardiotrack_export_2025-03-07.csv`.
pub fn export_file_name(today: NaiveDate, format: ExportFormat) -> String {
    format!(
        "cardiotrack_export_{}.{}",
        today.format("%Y-%m-%d"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn utc() -> DisplayZone {
        DisplayZone::Named(chrono_tz::UTC)
    }

    fn reading(note: Option<&str>) -> Observation {
        Observation {
            id: "3f1c".to_string(),
            systolic: 128,
            diastolic: 82,
            pulse: 71,
            timestamp: Utc
                .with_ymd_and_hms(2025, 3, 7, 8, 5, 0)
                .unwrap()
                .timestamp_millis(),
            note: note.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_csv_is_header_only() {
        assert_eq!(to_csv(&[], utc()), CSV_HEADER);
    }

    #[test]
    fn test_csv_row_layout() {
        let csv = to_csv(&[reading(None)], utc());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "3/7/2025,8:05:00 AM,128,82,71,\"\"");
    }

    #[test]
    fn test_note_with_comma_stays_quoted() {
        let csv = to_csv(&[reading(Some("tired, after run"))], utc());
        let row = csv.lines().nth(1).unwrap();
        assert!(row.ends_with(",\"tired, after run\""));

        // Splitting outside quotes yields exactly six columns.
        let mut columns = 1;
        let mut quoted = false;
        for c in row.chars() {
            match c {
                '"' => quoted = !quoted,
                ',' if !quoted => columns += 1,
                _ => {}
            }
        }
        assert_eq!(columns, 6);
    }

    #[test]
    fn test_embedded_quotes_are_not_escaped() {
        let csv = to_csv(&[reading(Some("said \"ok\""))], utc());
        assert!(csv.ends_with(",\"said \"ok\"\""));
    }

    #[test]
    fn test_json_round_trip() {
        let records = vec![reading(Some("left arm")), reading(None)];
        let json = to_json(&records).unwrap();
        assert!(json.contains("\n  {"));
        assert_eq!(from_json(&json).unwrap(), records);
    }

    #[test]
    fn test_export_file_name() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(
            export_file_name(day, ExportFormat::Csv),
            "cardiotrack_export_2025-03-07.csv"
        );
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
    }
}
