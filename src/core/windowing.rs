//! Time-range windowing of the record list for chart series.
//!
//! A window is a rolling calendar range (last week, month or year) anchored
//! to the evaluation instant. Windowed output is oldest-first, the order
//! charts draw in; the canonical list itself stays newest-first.

use crate::core::analytics::Category;
use crate::core::record::Observation;
use crate::display::DisplayZone;
use chrono::{DateTime, Days, Months, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    /// Last 7 calendar days
    #[default]
    Week,
    /// Last calendar month
    Month,
    /// Last calendar year
    Year,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [TimeRange::Week, TimeRange::Month, TimeRange::Year];

    /// Wall-clock start of the window ending at `now`.
    ///
    /// Month and year steps clamp to the last valid day, so one month
    /// before March 31 is the last day of February.
    pub fn cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        let start = match self {
            TimeRange::Week => now.checked_sub_days(Days::new(7)),
            TimeRange::Month => now.checked_sub_months(Months::new(1)),
            TimeRange::Year => now.checked_sub_months(Months::new(12)),
        };
        start.unwrap_or(NaiveDateTime::MIN)
    }

    /// Epoch-millisecond cutoff for a window ending at `now`, with the
    /// calendar arithmetic done in `zone`.
    ///
    /// A cutoff skipped by a DST jump moves forward past the gap.
    pub fn cutoff_millis(&self, now: DateTime<Utc>, zone: DisplayZone) -> i64 {
        let wall = self.cutoff(zone.wall_clock(now));
        zone.from_local(wall)
            .or_else(|| zone.from_local(wall + chrono::Duration::hours(1)))
            .unwrap_or_else(|| wall.and_utc().timestamp_millis())
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeRange::Week => write!(f, "week"),
            TimeRange::Month => write!(f, "month"),
            TimeRange::Year => write!(f, "year"),
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "year" => Ok(TimeRange::Year),
            other => Err(format!("unknown time range '{other}' (expected week, month or year)")),
        }
    }
}

/// Records taken at or after the window cutoff, oldest first.
///
/// The newest-first input is reversed and then stably sorted by timestamp,
/// so readings entered out of order still chart chronologically while
/// readings sharing a timestamp keep their insertion order.
pub fn window(
    records: &[Observation],
    range: TimeRange,
    now: DateTime<Utc>,
    zone: DisplayZone,
) -> Vec<&Observation> {
    let cutoff = range.cutoff_millis(now, zone);

    let mut windowed: Vec<&Observation> = records
        .iter()
        .rev()
        .filter(|r| r.timestamp >= cutoff)
        .collect();
    windowed.sort_by_key(|r| r.timestamp);
    windowed
}

/// One point of a chart series.
#[derive(Debug, Clone, Serialize)]
pub struct ChartPoint<'a> {
    #[serde(flatten)]
    pub record: &'a Observation,
    /// Short date label, e.g. `Mar 7`
    pub label: String,
    pub category: Category,
}

/// The windowed series with display labels attached. Labels never change
/// membership or order.
pub fn chart_points<'a>(
    records: &'a [Observation],
    range: TimeRange,
    now: DateTime<Utc>,
    zone: DisplayZone,
) -> Vec<ChartPoint<'a>> {
    window(records, range, now, zone)
        .into_iter()
        .map(|record| ChartPoint {
            record,
            label: zone.short_label(record.timestamp),
            category: record.category(),
        })
        .collect()
}
