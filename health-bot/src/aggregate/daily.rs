//! Same-day aggregate for one user and category.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde_json::Value;
use storage::{HealthLogQuery, HealthLogRecord, LogStore, StorageError};
use tracing::{instrument, warn};

use super::SkippedEntry;
use crate::category::Category;
use crate::payload::lenient;

pub const NO_RECORDS_TODAY: &str = "今日尚無紀錄。";
const DIGEST_PREFIX: &str = "今日歷史明細：";

/// A diet entry whose `calories` could not be read; it contributes zero to the total.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseAnomaly {
    pub entry_id: String,
    pub raw_value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyStats {
    /// Sum of diet `calories` today; 0 for other categories.
    pub total: f64,
    /// `今日歷史明細：<json list>` or [`NO_RECORDS_TODAY`].
    pub digest: String,
    pub entries: usize,
    pub skipped: Vec<SkippedEntry>,
    pub anomalies: Vec<ParseAnomaly>,
}

impl DailyStats {
    pub fn empty() -> Self {
        Self {
            total: 0.0,
            digest: NO_RECORDS_TODAY.to_string(),
            entries: 0,
            skipped: Vec::new(),
            anomalies: Vec::new(),
        }
    }
}

/// Aggregates the given same-day rows (query order is kept in the digest).
pub fn summarize_day(category: Category, records: &[HealthLogRecord]) -> DailyStats {
    if records.is_empty() {
        return DailyStats::empty();
    }

    let mut stats = DailyStats::empty();
    stats.entries = records.len();
    let mut history = Vec::with_capacity(records.len());

    for record in records {
        let payload: Value = match serde_json::from_str(&record.structured_data) {
            Ok(v) => v,
            Err(e) => {
                warn!(entry_id = %record.id, error = %e, "Daily aggregate: skipping malformed payload");
                stats.skipped.push(SkippedEntry::new(&record.id, e.to_string()));
                continue;
            }
        };

        if category == Category::Diet {
            let raw = payload.get("calories");
            match raw.and_then(lenient::number_from_value) {
                Some(calories) => stats.total += calories,
                None => {
                    warn!(entry_id = %record.id, calories = ?raw, "Daily aggregate: non-numeric calories counted as 0");
                    stats.anomalies.push(ParseAnomaly {
                        entry_id: record.id.clone(),
                        raw_value: raw.cloned(),
                    });
                }
            }
        }

        history.push(payload);
    }

    stats.digest = format!("{}{}", DIGEST_PREFIX, Value::Array(history));
    stats
}

/// Loads today's rows (local calendar day of `now`) for `user_id` and `category` and aggregates them.
#[instrument(skip(store))]
pub async fn daily_stats(
    store: &dyn LogStore,
    user_id: &str,
    category: Category,
    now: NaiveDateTime,
) -> Result<DailyStats, StorageError> {
    let start = now.date().and_time(NaiveTime::MIN);
    let end = start + Duration::days(1);
    let query = HealthLogQuery::since(user_id, start)
        .with_category(category.label())
        .until(end);
    let records = store.find_entries(&query).await?;
    Ok(summarize_day(category, &records))
}
