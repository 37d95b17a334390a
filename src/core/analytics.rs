//! Summary statistics and clinical categorisation over a record list.
//!
//! Every function here is pure and takes the canonical newest-first list
//! (or any slice of it) as input.

use crate::core::record::Observation;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Systolic guide lines drawn on trend charts (mmHg).
pub const SYSTOLIC_GUIDES: [u32; 2] = [120, 140];

/// Diastolic guide lines drawn on trend charts (mmHg).
pub const DIASTOLIC_GUIDES: [u32; 2] = [80, 90];

/// Clinical severity bucket for a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Normal,
    Elevated,
    Stage1,
    Stage2,
    Crisis,
}

impl Category {
    /// All categories, least to most severe.
    pub const ALL: [Category; 5] = [
        Category::Normal,
        Category::Elevated,
        Category::Stage1,
        Category::Stage2,
        Category::Crisis,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Normal => "Normal",
            Category::Elevated => "Elevated",
            Category::Stage1 => "Stage 1",
            Category::Stage2 => "Stage 2",
            Category::Crisis => "Crisis/Severe",
        }
    }

    /// Chart colour for this category.
    pub fn color(&self) -> &'static str {
        match self {
            Category::Normal => "#22c55e",
            Category::Elevated => "#eab308",
            Category::Stage1 => "#f97316",
            Category::Stage2 => "#e11d48",
            Category::Crisis => "#be123c",
        }
    }

    fn index(&self) -> usize {
        match self {
            Category::Normal => 0,
            Category::Elevated => 1,
            Category::Stage1 => 2,
            Category::Stage2 => 3,
            Category::Crisis => 4,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a reading. Rules are checked in order and the first match wins,
/// so `125/95` is Stage 2 even though its systolic alone would be Elevated.
pub fn classify(systolic: u32, diastolic: u32) -> Category {
    if systolic > 180 || diastolic > 120 {
        Category::Crisis
    } else if systolic >= 140 || diastolic >= 90 {
        Category::Stage2
    } else if systolic >= 130 || diastolic >= 80 {
        Category::Stage1
    } else if systolic >= 120 && diastolic < 80 {
        Category::Elevated
    } else {
        Category::Normal
    }
}

impl Observation {
    pub fn category(&self) -> Category {
        classify(self.systolic, self.diastolic)
    }
}

/// Coarse colour tone of the latest-reading card.
///
/// Uses its own, looser thresholds and is independent of [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Good,
    Raised,
    High,
}

pub fn status_tone(systolic: u32, diastolic: u32) -> StatusTone {
    if systolic > 140 || diastolic > 90 {
        StatusTone::High
    } else if systolic > 120 || diastolic > 80 {
        StatusTone::Raised
    } else {
        StatusTone::Good
    }
}

/// The most recently added reading.
pub fn latest(records: &[Observation]) -> Option<&Observation> {
    records.first()
}

/// The first `count` readings of the canonical list.
pub fn recent(records: &[Observation], count: usize) -> &[Observation] {
    &records[..count.min(records.len())]
}

/// Rounded means over a whole record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Averages {
    pub systolic: u32,
    pub diastolic: u32,
    pub pulse: u32,
    /// Number of readings averaged
    pub count: usize,
}

/// Mean systolic, diastolic and pulse across every record passed in, each
/// rounded half-up. Returns `None` for an empty set.
pub fn averages(records: &[Observation]) -> Option<Averages> {
    if records.is_empty() {
        return None;
    }

    let (sys, dia, pulse) = records.iter().fold((0u64, 0u64, 0u64), |acc, r| {
        (
            acc.0 + u64::from(r.systolic),
            acc.1 + u64::from(r.diastolic),
            acc.2 + u64::from(r.pulse),
        )
    });
    let n = records.len() as u64;

    Some(Averages {
        systolic: rounded_mean(sys, n),
        diastolic: rounded_mean(dia, n),
        pulse: rounded_mean(pulse, n),
        count: records.len(),
    })
}

/// `round(sum / n)` with halves going up, in integer arithmetic.
fn rounded_mean(sum: u64, n: u64) -> u32 {
    ((2 * sum + n) / (2 * n)) as u32
}

/// Range and population standard deviation of one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spread {
    pub min: u32,
    pub max: u32,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpreadSummary {
    pub systolic: Spread,
    pub diastolic: Spread,
    pub pulse: Spread,
}

/// Min, max and standard deviation per measurement. `None` for an empty set.
pub fn spread(records: &[Observation]) -> Option<SpreadSummary> {
    if records.is_empty() {
        return None;
    }

    Some(SpreadSummary {
        systolic: spread_of(records.iter().map(|r| r.systolic)),
        diastolic: spread_of(records.iter().map(|r| r.diastolic)),
        pulse: spread_of(records.iter().map(|r| r.pulse)),
    })
}

fn spread_of(values: impl Iterator<Item = u32>) -> Spread {
    let values: Vec<u32> = values.collect();
    let as_f64: Vec<f64> = values.iter().map(|&v| f64::from(v)).collect();

    Spread {
        min: values.iter().copied().min().unwrap_or(0),
        max: values.iter().copied().max().unwrap_or(0),
        std_dev: as_f64.iter().population_std_dev(),
    }
}

/// Number of readings falling in one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

/// Count readings per category. Every category is present, in severity order,
/// including those with a zero count.
pub fn distribution<'a, I>(records: I) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut counts = [0usize; 5];
    for record in records {
        counts[record.category().index()] += 1;
    }

    Category::ALL
        .iter()
        .map(|&category| CategoryCount {
            category,
            count: counts[category.index()],
        })
        .collect()
}
