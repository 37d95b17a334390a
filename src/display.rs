//! Calendar and clock rendering of observation timestamps.
//!
//! Timestamps are stored as epoch milliseconds. Everything the user reads
//! (CSV cells, sync rows, chart labels) goes through a [`DisplayZone`], which is
//! either the system's local zone or a named IANA zone from the config.

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Long date, e.g. `3/7/2025`.
pub const DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Clock time with seconds, e.g. `8:05:00 AM`.
pub const TIME_FORMAT: &str = "%-I:%M:%S %p";

/// Short chart label, e.g. `Mar 7`.
pub const SHORT_LABEL_FORMAT: &str = "%b %-d";

/// Hour and minute, e.g. `08:05`.
pub const CLOCK_FORMAT: &str = "%H:%M";

/// The zone used to turn instants into calendar dates and clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// The zone configured on this machine.
    #[default]
    Local,
    /// A fixed IANA zone.
    Named(Tz),
}

impl DisplayZone {
    /// Resolve an IANA zone name such as `Europe/Berlin`.
    pub fn from_name(name: &str) -> Option<Self> {
        name.trim().parse::<Tz>().ok().map(Self::Named)
    }

    /// Wall-clock time of an epoch-millisecond instant in this zone.
    pub fn to_local(&self, timestamp_ms: i64) -> Option<NaiveDateTime> {
        let instant = DateTime::<Utc>::from_timestamp_millis(timestamp_ms)?;
        Some(self.wall_clock(instant))
    }

    /// Wall-clock time of a UTC instant in this zone.
    pub fn wall_clock(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            DisplayZone::Local => instant.with_timezone(&Local).naive_local(),
            DisplayZone::Named(tz) => instant.with_timezone(tz).naive_local(),
        }
    }

    /// Epoch milliseconds of a wall-clock time in this zone.
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant;
    /// times skipped by a DST jump return `None`.
    pub fn from_local(&self, wall_clock: NaiveDateTime) -> Option<i64> {
        match self {
            DisplayZone::Local => earliest_millis(Local.from_local_datetime(&wall_clock)),
            DisplayZone::Named(tz) => earliest_millis(tz.from_local_datetime(&wall_clock)),
        }
    }

    /// Render a timestamp with a chrono format string. Out-of-range
    /// timestamps render as an empty string.
    pub fn format(&self, timestamp_ms: i64, pattern: &str) -> String {
        self.to_local(timestamp_ms)
            .map(|dt| dt.format(pattern).to_string())
            .unwrap_or_default()
    }

    pub fn format_date(&self, timestamp_ms: i64) -> String {
        self.format(timestamp_ms, DATE_FORMAT)
    }

    pub fn format_time(&self, timestamp_ms: i64) -> String {
        self.format(timestamp_ms, TIME_FORMAT)
    }

    pub fn short_label(&self, timestamp_ms: i64) -> String {
        self.format(timestamp_ms, SHORT_LABEL_FORMAT)
    }

    pub fn format_clock(&self, timestamp_ms: i64) -> String {
        self.format(timestamp_ms, CLOCK_FORMAT)
    }

    /// Date followed by 24-hour clock, e.g. `3/7/2025 20:05`.
    pub fn format_stamp(&self, timestamp_ms: i64) -> String {
        format!(
            "{} {}",
            self.format_date(timestamp_ms),
            self.format_clock(timestamp_ms)
        )
    }
}

impl std::fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayZone::Local => write!(f, "local"),
            DisplayZone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

fn earliest_millis<T: TimeZone>(result: LocalResult<DateTime<T>>) -> Option<i64> {
    result.earliest().map(|dt| dt.timestamp_millis())
}
