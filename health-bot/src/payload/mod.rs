//! Typed structured payloads, one shape per category.
//!
//! The model's `structured_json` is parsed into the variant of the turn's category; unknown or
//! missing keys are rejected. The stored JSON is the serialized inner payload.

pub mod lenient;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::category::Category;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Macros {
    #[serde(deserialize_with = "lenient::optional_number")]
    pub carbs_g: Option<f64>,
    #[serde(deserialize_with = "lenient::optional_number")]
    pub protein_g: Option<f64>,
    #[serde(deserialize_with = "lenient::optional_number")]
    pub fat_g: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DietPayload {
    #[serde(deserialize_with = "lenient::text")]
    pub items: String,
    /// Calories of this turn only.
    #[serde(deserialize_with = "lenient::number")]
    pub calories: f64,
    pub macros: Macros,
    #[serde(deserialize_with = "lenient::optional_number")]
    pub sodium_mg: Option<f64>,
    /// Today's running total including this turn; overwritten from the daily aggregate.
    #[serde(deserialize_with = "lenient::optional_number")]
    pub total_calories: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SleepMetrics {
    #[serde(deserialize_with = "lenient::number")]
    pub hours: f64,
    #[serde(deserialize_with = "lenient::optional_number")]
    pub sleep_latency_min: Option<f64>,
    #[serde(deserialize_with = "lenient::optional_number")]
    pub waso_min: Option<f64>,
    #[serde(deserialize_with = "lenient::optional_number")]
    pub efficiency_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QualityAssessment {
    #[serde(deserialize_with = "lenient::text")]
    pub level: String,
    #[serde(deserialize_with = "lenient::text")]
    pub primary_dimension: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureDetection {
    #[serde(deserialize_with = "lenient::optional_text")]
    pub snoring_osa_risk: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub caffeine_impact: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub alcohol_rebound: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub dreaming_stage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SleepPayload {
    pub detected_metrics: SleepMetrics,
    pub quality_assessment: QualityAssessment,
    pub feature_detection: FeatureDetection,
}

/// Severity tier of a chronic metric, carried on the wire as its emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Normal,
    Elevated,
    High,
    Critical,
    Unrecorded,
}

impl Tier {
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        match emoji.trim() {
            "🟢" => Some(Tier::Normal),
            "🟡" => Some(Tier::Elevated),
            "🟠" => Some(Tier::High),
            "🔴" => Some(Tier::Critical),
            "⚪" => Some(Tier::Unrecorded),
            _ => None,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Tier::Normal => "🟢",
            Tier::Elevated => "🟡",
            Tier::High => "🟠",
            Tier::Critical => "🔴",
            Tier::Unrecorded => "⚪",
        }
    }

    /// Recorded and not normal. Unrecorded metrics are never abnormal.
    pub fn is_abnormal(&self) -> bool {
        matches!(self, Tier::Elevated | Tier::High | Tier::Critical)
    }

    pub fn severity(&self) -> u8 {
        match self {
            Tier::Normal | Tier::Unrecorded => 0,
            Tier::Elevated => 1,
            Tier::High => 2,
            Tier::Critical => 3,
        }
    }

    /// Key of the guidance level in the chronic reference document.
    pub fn level_key(&self) -> Option<&'static str> {
        match self {
            Tier::Elevated => Some("elevated"),
            Tier::High => Some("high"),
            Tier::Critical => Some("critical"),
            Tier::Normal | Tier::Unrecorded => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Metric {
    #[serde(deserialize_with = "lenient::text")]
    pub value: String,
    #[serde(deserialize_with = "lenient::text")]
    pub status: String,
    #[serde(deserialize_with = "lenient::text")]
    pub emoji: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub is_alert: bool,
}

pub const UNRECORDED_VALUE: &str = "未紀錄";

impl Metric {
    pub fn unrecorded() -> Self {
        Self {
            value: UNRECORDED_VALUE.to_string(),
            status: "-".to_string(),
            emoji: Tier::Unrecorded.emoji().to_string(),
            is_alert: false,
        }
    }

    pub fn is_unrecorded(&self) -> bool {
        let value = self.value.trim();
        value.is_empty() || value.contains(UNRECORDED_VALUE) || self.emoji.trim() == Tier::Unrecorded.emoji()
    }

    /// Tier from the emoji; an unrecognized emoji falls back to the alert flag.
    pub fn tier(&self) -> Tier {
        if self.is_unrecorded() {
            return Tier::Unrecorded;
        }
        Tier::from_emoji(&self.emoji).unwrap_or(if self.is_alert {
            Tier::High
        } else {
            Tier::Normal
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChronicPayload {
    pub blood_pressure: Metric,
    pub heart_rate: Metric,
    pub blood_sugar: Metric,
    #[serde(rename = "BMI")]
    pub bmi: Metric,
    #[serde(deserialize_with = "lenient::text")]
    pub dash_section: String,
    #[serde(deserialize_with = "lenient::text")]
    pub metabolic_alert: String,
    /// Weight stated in this turn, if any.
    #[serde(deserialize_with = "lenient::optional_number")]
    pub reported_weight_kg: Option<f64>,
}

/// Tagged union of the per-category payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredPayload {
    Diet(DietPayload),
    Sleep(SleepPayload),
    Chronic(ChronicPayload),
}

impl StructuredPayload {
    /// Parses `value` against the shape of `category`. `Unknown` has no shape.
    pub fn parse(category: Category, value: Value) -> Result<Self, serde_json::Error> {
        use serde::de::Error as _;
        match category {
            Category::Diet => serde_json::from_value(value).map(StructuredPayload::Diet),
            Category::Sleep => serde_json::from_value(value).map(StructuredPayload::Sleep),
            Category::Chronic => serde_json::from_value(value).map(StructuredPayload::Chronic),
            Category::Unknown => Err(serde_json::Error::custom(
                "no structured shape for an unknown category",
            )),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            StructuredPayload::Diet(_) => Category::Diet,
            StructuredPayload::Sleep(_) => Category::Sleep,
            StructuredPayload::Chronic(_) => Category::Chronic,
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            StructuredPayload::Diet(p) => serde_json::to_value(p),
            StructuredPayload::Sleep(p) => serde_json::to_value(p),
            StructuredPayload::Chronic(p) => serde_json::to_value(p),
        }
    }
}
