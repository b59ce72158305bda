//! Chronic-record policy applied in code after extraction.
//!
//! The model proposes metric tiers; this module normalizes unrecorded metrics, recomputes BMI
//! from stored data, and derives `dash_section` and `metabolic_alert` from the tiers plus the
//! chronic reference document. The chronic advice is then rendered from the finalized payload.

use serde_json::Value;

use crate::payload::{lenient, ChronicPayload, Metric, Tier};

pub const STORED_DATA_NOTE: &str = "(存檔資料)";
pub const NO_GUIDANCE: &str = "請持續觀察並定期測量";
pub const KEEP_GOING_PLAN: &str = "🎯 行動計畫：繼續保持優良生活習慣！";
pub const METABOLIC_ALERT: &str = "⚠️ 符合代謝症候群指標,心血管疾病風險大幅提升";
pub const SEPARATOR: &str = "━━━━━━━━━━━━━━";

/// Body measures read from the stored profile.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StoredMeasures {
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
}

/// kg / m², one decimal.
pub fn compute_bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return None;
    }
    let m = height_cm / 100.0;
    Some((weight_kg / (m * m) * 10.0).round() / 10.0)
}

pub fn bmi_tier(bmi: f64) -> (Tier, &'static str) {
    if bmi < 18.5 {
        (Tier::Elevated, "過輕")
    } else if bmi < 24.0 {
        (Tier::Normal, "正常")
    } else if bmi < 27.0 {
        (Tier::High, "過重")
    } else {
        (Tier::Critical, "肥胖")
    }
}

/// BMI metric from this turn's weight (preferred) or the stored weight, and the stored height.
/// Unrecorded when either is missing.
pub fn bmi_metric(reported_weight_kg: Option<f64>, stored: &StoredMeasures) -> Metric {
    let (weight, from_store) = match (reported_weight_kg, stored.weight_kg) {
        (Some(w), _) => (w, false),
        (None, Some(w)) => (w, true),
        (None, None) => return Metric::unrecorded(),
    };
    let Some(bmi) = stored.height_cm.and_then(|h| compute_bmi(weight, h)) else {
        return Metric::unrecorded();
    };
    let (tier, label) = bmi_tier(bmi);
    let status = if from_store {
        format!("{} {}", label, STORED_DATA_NOTE)
    } else {
        label.to_string()
    };
    Metric {
        value: format!("{:.1}", bmi),
        status,
        emoji: tier.emoji().to_string(),
        is_alert: tier.is_abnormal(),
    }
}

fn normalize_metric(metric: &mut Metric) {
    if metric.is_unrecorded() {
        *metric = Metric::unrecorded();
        return;
    }
    let tier = metric.tier();
    metric.emoji = tier.emoji().to_string();
    metric.is_alert = tier.is_abnormal();
}

fn highest(tiers: &[Tier]) -> Tier {
    tiers
        .iter()
        .copied()
        .filter(Tier::is_abnormal)
        .max_by_key(Tier::severity)
        .unwrap_or(Tier::Normal)
}

fn guidance<'a>(knowledge: Option<&'a Value>, section: &str, tier: Tier) -> Option<&'a Value> {
    let level = tier.level_key()?;
    knowledge?.get(section)?.get(level)
}

fn field(entry: &Value, key: &str) -> String {
    entry
        .get(key)
        .map(lenient::text_from_value)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| NO_GUIDANCE.to_string())
}

fn action_plan_lines(plan: &Value) -> String {
    format!(
        "立即：{}\n本週：{}\n每月：{}",
        field(plan, "immediate"),
        field(plan, "weekly"),
        field(plan, "monthly")
    )
}

/// DASH block plus action plan, read from `dash_diet.<level>` and `action_plans.<level>`.
fn dash_block(knowledge: Option<&Value>, tier: Tier) -> String {
    let (Some(dash), Some(plan)) = (
        guidance(knowledge, "dash_diet", tier),
        guidance(knowledge, "action_plans", tier),
    ) else {
        return NO_GUIDANCE.to_string();
    };
    format!(
        "🥗 DASH 飲食建議\n每日鈉攝取：{}\n建議食物：{}\n避免食物：{}\n範例菜單：{}\n\n🎯 行動計畫\n{}",
        field(dash, "sodium"),
        field(dash, "foods_eat"),
        field(dash, "foods_avoid"),
        field(dash, "sample_menu"),
        action_plan_lines(plan)
    )
}

fn action_plan_block(knowledge: Option<&Value>, tier: Tier) -> String {
    match guidance(knowledge, "action_plans", tier) {
        Some(plan) => format!("🎯 行動計畫\n{}", action_plan_lines(plan)),
        None => NO_GUIDANCE.to_string(),
    }
}

/// DASH block iff blood pressure or blood sugar is abnormal; action plan only when just BMI or
/// heart rate is; the keep-going plan otherwise.
pub fn dash_section(payload: &ChronicPayload, knowledge: Option<&Value>) -> String {
    let bp = payload.blood_pressure.tier();
    let bs = payload.blood_sugar.tier();
    if bp.is_abnormal() || bs.is_abnormal() {
        return dash_block(knowledge, highest(&[bp, bs]));
    }
    let bmi = payload.bmi.tier();
    let hr = payload.heart_rate.tier();
    if bmi.is_abnormal() || hr.is_abnormal() {
        return action_plan_block(knowledge, highest(&[bmi, hr]));
    }
    KEEP_GOING_PLAN.to_string()
}

/// Non-empty iff blood pressure, blood sugar and BMI are all abnormal.
pub fn metabolic_alert(payload: &ChronicPayload) -> String {
    let all_abnormal = [&payload.blood_pressure, &payload.blood_sugar, &payload.bmi]
        .iter()
        .all(|m| m.tier().is_abnormal());
    if all_abnormal {
        METABOLIC_ALERT.to_string()
    } else {
        String::new()
    }
}

/// Applies the chronic policy in place.
pub fn finalize(payload: &mut ChronicPayload, stored: &StoredMeasures, knowledge: Option<&Value>) {
    normalize_metric(&mut payload.blood_pressure);
    normalize_metric(&mut payload.heart_rate);
    normalize_metric(&mut payload.blood_sugar);
    payload.bmi = bmi_metric(payload.reported_weight_kg, stored);
    payload.dash_section = dash_section(payload, knowledge);
    payload.metabolic_alert = metabolic_alert(payload);
}

fn metric_line(label: &str, metric: &Metric) -> String {
    format!("{} {}：{} → {}", metric.emoji, label, metric.value, metric.status)
}

/// Advice body for a finalized payload; header and disclaimer are normalized by the caller.
/// The metric lines and metabolic alert precede the guidance block; truncation only shortens guidance.
pub fn render_advice(payload: &ChronicPayload, record_time: &str) -> String {
    let mut out = format!(
        "【紀錄日期】 {}\n📊 檢測結果\n{}\n{}\n{}\n{}",
        record_time,
        metric_line("血壓", &payload.blood_pressure),
        metric_line("心率", &payload.heart_rate),
        metric_line("血糖", &payload.blood_sugar),
        metric_line("BMI", &payload.bmi)
    );
    if !payload.metabolic_alert.is_empty() {
        out.push('\n');
        out.push_str(&payload.metabolic_alert);
    }
    out.push('\n');
    out.push_str(SEPARATOR);
    out.push('\n');
    out.push_str(&payload.dash_section);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_bmi() {
        assert_eq!(compute_bmi(50.0, 165.0), Some(18.4));
        assert_eq!(compute_bmi(80.0, 170.0), Some(27.7));
        assert_eq!(compute_bmi(70.0, 0.0), None);
    }

    #[test]
    fn test_bmi_tiers() {
        assert_eq!(bmi_tier(18.4).0, Tier::Elevated);
        assert_eq!(bmi_tier(22.0).0, Tier::Normal);
        assert_eq!(bmi_tier(24.0).0, Tier::High);
        assert_eq!(bmi_tier(27.0).0, Tier::Critical);
    }

    #[test]
    fn test_bmi_prefers_reported_weight() {
        let stored = StoredMeasures {
            height_cm: Some(170.0),
            weight_kg: Some(60.0),
        };
        let m = bmi_metric(Some(80.0), &stored);
        assert_eq!(m.value, "27.7");
        assert_eq!(m.status, "肥胖");
        assert!(m.is_alert);
    }

    #[test]
    fn test_bmi_from_stored_weight_is_annotated() {
        let stored = StoredMeasures {
            height_cm: Some(170.0),
            weight_kg: Some(60.0),
        };
        let m = bmi_metric(None, &stored);
        assert_eq!(m.value, "20.8");
        assert_eq!(m.status, "正常 (存檔資料)");
        assert_eq!(m.emoji, "🟢");
    }

    #[test]
    fn test_bmi_without_height_is_unrecorded() {
        let stored = StoredMeasures {
            height_cm: None,
            weight_kg: Some(60.0),
        };
        assert_eq!(bmi_metric(Some(70.0), &stored), Metric::unrecorded());
    }
}
