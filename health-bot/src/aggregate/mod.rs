//! Numeric aggregates over stored health logs.
//!
//! - [`daily`]: same-day total and history digest for one category (fed into extraction prompts)
//! - [`weekly`]: 7-day per-category statistics (fed into the weekly report)
//!
//! Rows whose payload cannot be used are reported in `skipped`, never fail the aggregation.

pub mod daily;
pub mod weekly;

pub use daily::{daily_stats, summarize_day, DailyStats, ParseAnomaly, NO_RECORDS_TODAY};
pub use weekly::{
    summarize_week, weekly_summary, ChronicWeek, DietWeek, SleepWeek, WeeklySummary,
};

/// A stored row left out of an aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    pub entry_id: String,
    pub reason: String,
}

impl SkippedEntry {
    pub(crate) fn new(entry_id: &str, reason: impl Into<String>) -> Self {
        Self {
            entry_id: entry_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Renders a number without a trailing `.0` (`1050` rather than `1050.0`).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", (value * 10.0).round() / 10.0)
    }
}

/// Rounds to one decimal.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
