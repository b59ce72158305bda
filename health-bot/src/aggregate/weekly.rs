//! 7-day statistics across all categories, used by the weekly report.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::{json, Map, Value};
use storage::{HealthLogQuery, HealthLogRecord, LogStore, StorageError};
use tracing::{instrument, warn};

use super::{round1, SkippedEntry};
use crate::category::Category;
use crate::payload::{lenient, UNRECORDED_VALUE};

pub const WEEK_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DietWeek {
    pub days: usize,
    pub total_calories: f64,
    /// total / days, one decimal; 0 when there are no days.
    pub average_calories: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SleepWeek {
    pub days: usize,
    pub total_hours: f64,
    pub average_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChronicWeek {
    pub entries: usize,
    pub blood_pressure: Vec<String>,
    pub heart_rate: Vec<String>,
    pub blood_sugar: Vec<String>,
    pub alerts: usize,
}

/// One measurement sub-item of a chronic entry.
#[derive(Debug, Clone, PartialEq)]
struct Measurement {
    kind: String,
    value: String,
    is_alert: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklySummary {
    pub diet: DietWeek,
    pub sleep: SleepWeek,
    pub chronic: ChronicWeek,
    /// Per-category `{"時間", "數據"}` details of the rows that parsed, in time order.
    pub details: Map<String, Value>,
    pub skipped: Vec<SkippedEntry>,
}

impl WeeklySummary {
    /// True when the window holds no usable row at all.
    pub fn is_empty(&self) -> bool {
        self.details
            .values()
            .all(|v| v.as_array().map_or(true, |a| a.is_empty()))
    }

    pub fn details_json(&self) -> String {
        Value::Object(self.details.clone()).to_string()
    }
}

fn sleep_hours(payload: &Value) -> Option<f64> {
    payload
        .get("detected_metrics")
        .and_then(|m| m.get("hours"))
        .or_else(|| payload.get("hours"))
        .and_then(lenient::number_from_value)
}

/// Sub-items of a chronic payload: a list is used as-is; the chronic record object is flattened
/// into 血壓/心率/血糖/BMI items with unrecorded metrics left out. Other shapes yield `None`.
fn chronic_measurements(payload: &Value) -> Option<Vec<Measurement>> {
    match payload {
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| Measurement {
                    kind: item.get("type").map(lenient::text_from_value).unwrap_or_default(),
                    value: item.get("value").map(lenient::text_from_value).unwrap_or_default(),
                    is_alert: item.get("is_alert").and_then(Value::as_bool).unwrap_or(false),
                })
                .collect(),
        ),
        Value::Object(obj) if obj.contains_key("blood_pressure") => Some(
            [
                ("blood_pressure", "血壓"),
                ("heart_rate", "心率"),
                ("blood_sugar", "血糖"),
                ("BMI", "BMI"),
            ]
            .iter()
            .filter_map(|(key, kind)| {
                let metric = obj.get(*key)?;
                let value = metric.get("value").map(lenient::text_from_value)?;
                if value.trim().is_empty() || value.contains(UNRECORDED_VALUE) {
                    return None;
                }
                Some(Measurement {
                    kind: kind.to_string(),
                    value,
                    is_alert: metric.get("is_alert").and_then(Value::as_bool).unwrap_or(false),
                })
            })
            .collect(),
        ),
        _ => None,
    }
}

/// Aggregates rows from the window (any order; details keep the given order).
pub fn summarize_week(records: &[HealthLogRecord]) -> WeeklySummary {
    let mut summary = WeeklySummary::default();
    for category in Category::RECORDABLE {
        summary
            .details
            .insert(category.label().to_string(), Value::Array(Vec::new()));
    }

    let mut diet_days: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut sleep_days: BTreeSet<NaiveDate> = BTreeSet::new();

    for record in records {
        let Some(category) = Category::from_label(&record.category).filter(Category::is_recordable) else {
            summary
                .skipped
                .push(SkippedEntry::new(&record.id, format!("unknown category {}", record.category)));
            continue;
        };
        let payload: Value = match serde_json::from_str(&record.structured_data) {
            Ok(v) => v,
            Err(e) => {
                warn!(entry_id = %record.id, error = %e, "Weekly aggregate: skipping malformed payload");
                summary.skipped.push(SkippedEntry::new(&record.id, e.to_string()));
                continue;
            }
        };

        let used = match category {
            Category::Diet => match payload.get("calories").and_then(lenient::number_from_value) {
                Some(calories) => {
                    summary.diet.total_calories += calories;
                    diet_days.insert(record.created_at.date());
                    true
                }
                None => false,
            },
            Category::Sleep => match sleep_hours(&payload) {
                Some(hours) => {
                    summary.sleep.total_hours += hours;
                    sleep_days.insert(record.created_at.date());
                    true
                }
                None => false,
            },
            Category::Chronic => match chronic_measurements(&payload) {
                Some(items) => {
                    let chronic = &mut summary.chronic;
                    chronic.entries += 1;
                    for item in items {
                        if item.is_alert {
                            chronic.alerts += 1;
                        }
                        if item.kind.contains("血壓") {
                            chronic.blood_pressure.push(item.value);
                        } else if item.kind.contains("心率") {
                            chronic.heart_rate.push(item.value);
                        } else if item.kind.contains("血糖") {
                            chronic.blood_sugar.push(item.value);
                        }
                    }
                    true
                }
                None => false,
            },
            Category::Unknown => false,
        };

        if !used {
            warn!(entry_id = %record.id, category = %category, "Weekly aggregate: payload lacks expected fields");
            summary
                .skipped
                .push(SkippedEntry::new(&record.id, "missing expected fields"));
            continue;
        }

        if let Some(Value::Array(list)) = summary.details.get_mut(category.label()) {
            list.push(json!({
                "時間": record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                "數據": payload,
            }));
        }
    }

    summary.diet.days = diet_days.len();
    if summary.diet.days > 0 {
        summary.diet.average_calories = round1(summary.diet.total_calories / summary.diet.days as f64);
    }
    summary.sleep.days = sleep_days.len();
    if summary.sleep.days > 0 {
        summary.sleep.average_hours = round1(summary.sleep.total_hours / summary.sleep.days as f64);
    }
    summary
}

/// Loads the rows of `[now − 7 days, now]` for `user_id` and aggregates them.
#[instrument(skip(store))]
pub async fn weekly_summary(
    store: &dyn LogStore,
    user_id: &str,
    now: NaiveDateTime,
) -> Result<WeeklySummary, StorageError> {
    let start = now - Duration::days(WEEK_DAYS);
    let query = HealthLogQuery::since(user_id, start).until(now + Duration::seconds(1));
    let records = store.find_entries(&query).await?;
    Ok(summarize_week(&records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn record(category: &str, data: &str, created_at: NaiveDateTime) -> HealthLogRecord {
        HealthLogRecord::new("u1", category, "text", data, "advice").with_created_at(created_at)
    }

    #[test]
    fn test_empty_window_has_zero_averages() {
        let s = summarize_week(&[]);
        assert!(s.is_empty());
        assert_eq!(s.diet.average_calories, 0.0);
        assert_eq!(s.sleep.average_hours, 0.0);
        assert_eq!(s.chronic.entries, 0);
    }

    #[test]
    fn test_diet_average_over_distinct_days() {
        let rows = vec![
            record("飲食", r#"{"calories":600}"#, at(14, 8)),
            record("飲食", r#"{"calories":"900"}"#, at(14, 19)),
            record("飲食", r#"{"calories":1400}"#, at(15, 12)),
        ];
        let s = summarize_week(&rows);
        assert_eq!(s.diet.days, 2);
        assert_eq!(s.diet.total_calories, 2900.0);
        assert_eq!(s.diet.average_calories, 1450.0);
    }

    #[test]
    fn test_sleep_hours_nested_or_top_level() {
        let rows = vec![
            record("睡眠", r#"{"detected_metrics":{"hours":6.5}}"#, at(14, 8)),
            record("睡眠", r#"{"hours":"8"}"#, at(15, 8)),
            record("睡眠", r#"{"detected_metrics":{}}"#, at(16, 8)),
        ];
        let s = summarize_week(&rows);
        assert_eq!(s.sleep.days, 2);
        assert_eq!(s.sleep.average_hours, 7.3);
        assert_eq!(s.skipped.len(), 1);
    }

    #[test]
    fn test_chronic_list_and_object_shapes() {
        let list = r#"[{"type":"收縮壓/舒張壓 血壓","value":"140/90","is_alert":true},{"type":"血糖","value":"98","is_alert":false}]"#;
        let object = r#"{
            "blood_pressure":{"value":"128/82","status":"偏高","emoji":"🟡","is_alert":true},
            "heart_rate":{"value":"72","status":"正常","emoji":"🟢","is_alert":false},
            "blood_sugar":{"value":"未紀錄","status":"-","emoji":"⚪","is_alert":false},
            "BMI":{"value":"27.7","status":"肥胖","emoji":"🔴","is_alert":true},
            "dash_section":"","metabolic_alert":"","reported_weight_kg":null
        }"#;
        let rows = vec![
            record("慢性病", list, at(14, 8)),
            record("慢性病", object, at(15, 8)),
            record("慢性病", r#""just text""#, at(16, 8)),
        ];
        let s = summarize_week(&rows);
        assert_eq!(s.chronic.entries, 2);
        assert_eq!(s.chronic.blood_pressure, vec!["140/90", "128/82"]);
        assert_eq!(s.chronic.heart_rate, vec!["72"]);
        assert_eq!(s.chronic.blood_sugar, vec!["98"]);
        assert_eq!(s.chronic.alerts, 3);
        assert_eq!(s.skipped.len(), 1);
    }
}
