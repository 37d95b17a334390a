//! Validation of raw reading-form input.
//!
//! The record store only accepts well-typed observations. Anything typed by
//! a user passes through [`ReadingForm::into_observation`] first.

use crate::core::Observation;
use crate::display::DisplayZone;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Raw, unvalidated form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingForm {
    pub systolic: String,
    pub diastolic: String,
    pub pulse: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Clock time, `HH:MM`
    pub time: String,
    pub note: String,
}

impl ReadingForm {
    /// A form prefilled with typical values and the current date and time.
    pub fn prefilled(now: DateTime<Utc>, zone: DisplayZone) -> Self {
        let wall = zone.wall_clock(now);
        Self {
            systolic: "120".to_string(),
            diastolic: "80".to_string(),
            pulse: "72".to_string(),
            date: wall.format("%Y-%m-%d").to_string(),
            time: wall.format("%H:%M").to_string(),
            note: String::new(),
        }
    }

    /// Validate the form and build an observation with a fresh id.
    ///
    /// The date and time are combined as wall-clock time in `zone`.
    /// A blank note becomes an absent note.
    pub fn into_observation(self, zone: DisplayZone) -> Result<Observation, InputError> {
        let systolic = parse_measurement("systolic", &self.systolic)?;
        let diastolic = parse_measurement("diastolic", &self.diastolic)?;
        let pulse = parse_measurement("pulse", &self.pulse)?;

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| InputError::InvalidDate(self.date.clone()))?;
        let time = NaiveTime::parse_from_str(self.time.trim(), "%H:%M")
            .map_err(|_| InputError::InvalidTime(self.time.clone()))?;
        let wall = date.and_time(time);
        let timestamp = zone
            .from_local(wall)
            .ok_or_else(|| InputError::NonexistentTime(format!("{} {}", self.date, self.time)))?;

        let note = if self.note.trim().is_empty() {
            None
        } else {
            Some(self.note)
        };

        Ok(Observation::new(systolic, diastolic, pulse, timestamp, note))
    }
}

fn parse_measurement(field: &'static str, raw: &str) -> Result<u32, InputError> {
    let value: u32 = raw.trim().parse().map_err(|_| InputError::NotANumber {
        field,
        value: raw.to_string(),
    })?;
    if value == 0 {
        return Err(InputError::NotPositive { field });
    }
    Ok(value)
}

/// Reasons a form is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    NotANumber { field: &'static str, value: String },
    NotPositive { field: &'static str },
    InvalidDate(String),
    InvalidTime(String),
    /// The wall-clock time does not exist in the display zone (DST gap)
    NonexistentTime(String),
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::NotANumber { field, value } => {
                write!(f, "{field} must be a whole number, got '{value}'")
            }
            InputError::NotPositive { field } => write!(f, "{field} must be greater than zero"),
            InputError::InvalidDate(d) => write!(f, "Invalid date '{d}' (expected YYYY-MM-DD)"),
            InputError::InvalidTime(t) => write!(f, "Invalid time '{t}' (expected HH:MM)"),
            InputError::NonexistentTime(t) => write!(f, "Local time '{t}' does not exist"),
        }
    }
}

impl std::error::Error for InputError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc() -> DisplayZone {
        DisplayZone::Named(chrono_tz::UTC)
    }

    fn form() -> ReadingForm {
        ReadingForm {
            systolic: "132".to_string(),
            diastolic: " 84 ".to_string(),
            pulse: "66".to_string(),
            date: "2025-03-07".to_string(),
            time: "08:30".to_string(),
            note: "after coffee".to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let obs = form().into_observation(utc()).unwrap();
        assert_eq!(obs.systolic, 132);
        assert_eq!(obs.diastolic, 84);
        assert_eq!(obs.pulse, 66);
        assert_eq!(
            obs.timestamp,
            Utc.with_ymd_and_hms(2025, 3, 7, 8, 30, 0).unwrap().timestamp_millis()
        );
        assert_eq!(obs.note.as_deref(), Some("after coffee"));
    }

    #[test]
    fn test_rejects_non_numeric() {
        let mut bad = form();
        bad.pulse = "seventy".to_string();
        assert_eq!(
            bad.into_observation(utc()),
            Err(InputError::NotANumber {
                field: "pulse",
                value: "seventy".to_string()
            })
        );

        let mut negative = form();
        negative.systolic = "-120".to_string();
        assert!(matches!(
            negative.into_observation(utc()),
            Err(InputError::NotANumber { field: "systolic", .. })
        ));
    }

    #[test]
    fn test_rejects_zero() {
        let mut zero = form();
        zero.diastolic = "0".to_string();
        assert_eq!(
            zero.into_observation(utc()),
            Err(InputError::NotPositive { field: "diastolic" })
        );
    }

    #[test]
    fn test_rejects_bad_date_and_time() {
        let mut bad = form();
        bad.date = "07/03/2025".to_string();
        assert!(matches!(bad.into_observation(utc()), Err(InputError::InvalidDate(_))));

        let mut bad = form();
        bad.time = "25:00".to_string();
        assert!(matches!(bad.into_observation(utc()), Err(InputError::InvalidTime(_))));
    }

    #[test]
    fn test_blank_note_is_absent() {
        let mut blank = form();
        blank.note = "   ".to_string();
        assert_eq!(blank.into_observation(utc()).unwrap().note, None);
    }

    #[test]
    fn test_note_kept_as_typed() {
        let mut noted = form();
        noted.note = " left arm ".to_string();
        assert_eq!(
            noted.into_observation(utc()).unwrap().note.as_deref(),
            Some(" left arm ")
        );
    }

    #[test]
    fn test_prefilled_defaults() {
        let now = Utc.with_ymd_and_hms(2025, 3, 7, 21, 4, 0).unwrap();
        let form = ReadingForm::prefilled(now, utc());
        assert_eq!(form.systolic, "120");
        assert_eq!(form.diastolic, "80");
        assert_eq!(form.pulse, "72");
        assert_eq!(form.date, "2025-03-07");
        assert_eq!(form.time, "21:04");
    }
}
