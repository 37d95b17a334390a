//! Core data model and derived analytics.
//!
//! This module contains:
//! - The observation record
//! - Summary statistics and clinical categorisation
//! - Time-range windowing for chart series

pub mod analytics;
pub mod record;
pub mod windowing;

// Re-export commonly used types
pub use analytics::{
    averages, classify, distribution, latest, recent, spread, status_tone, Averages, Category,
    CategoryCount, Spread, SpreadSummary, StatusTone,
};
pub use record::Observation;
pub use windowing::{chart_points, window, ChartPoint, TimeRange};
