//! Extraction gateway: one JSON-mode model call per turn, validated against the contract.
//!
//! Every failure (transport, JSON, schema, wrong category echo) comes back as an
//! [`ExtractionError`]; nothing is applied by this module.

use std::sync::Arc;

use llm_client::LlmClient;
use serde_json::{Map, Value};
use storage::ProfileMetrics;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::category::Category;
use crate::contract::InstructionContract;
use crate::payload::{lenient, StructuredPayload};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("model call failed: {0}")]
    Transport(String),

    #[error("response is not a JSON object: {0}")]
    InvalidJson(String),

    #[error("unsupported intent: {0}")]
    UnknownIntent(String),

    #[error("missing or invalid field `{0}`")]
    MissingField(&'static str),

    #[error("category mismatch: prompt was {expected}, response says {actual}")]
    CategoryMismatch { expected: Category, actual: String },

    #[error("structured_json does not match the {category} shape: {reason}")]
    Schema { category: Category, reason: String },

    #[error("health record without a resolvable category")]
    UnresolvedCategory,
}

impl ExtractionError {
    /// The text could not be tied to any category; answered with a clarification, not a retry.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, ExtractionError::UnresolvedCategory)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthRecordDraft {
    pub category: Category,
    pub payload: StructuredPayload,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    ProfileUpdate(ProfileMetrics),
    HealthRecord(HealthRecordDraft),
}

#[derive(Clone)]
pub struct ExtractionGateway {
    llm: Arc<dyn LlmClient>,
}

impl ExtractionGateway {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    #[instrument(skip(self, contract, user_text), fields(category = %contract.category))]
    pub async fn extract(
        &self,
        contract: &InstructionContract,
        user_text: &str,
    ) -> Result<Extraction, ExtractionError> {
        let raw = self
            .llm
            .complete_json(contract.messages(user_text))
            .await
            .map_err(|e| ExtractionError::Transport(format!("{:#}", e)))?;
        info!(response_len = raw.len(), "step: extraction response received");
        parse_response(contract.category, &raw).map_err(|e| {
            warn!(error = %e, raw = %raw, "Extraction rejected");
            e
        })
    }
}

/// Drops a surrounding ```json fence if the model added one.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

fn required_number(obj: &Map<String, Value>, key: &'static str) -> Result<f64, ExtractionError> {
    obj.get(key)
        .and_then(lenient::number_from_value)
        .ok_or(ExtractionError::MissingField(key))
}

fn parse_profile(obj: &Map<String, Value>) -> Result<ProfileMetrics, ExtractionError> {
    let height = required_number(obj, "height")?;
    let weight = required_number(obj, "weight")?;
    let age = required_number(obj, "age")?;
    let gender = obj
        .get("gender")
        .map(lenient::text_from_value)
        .filter(|g| !g.trim().is_empty())
        .ok_or(ExtractionError::MissingField("gender"))?;
    Ok(ProfileMetrics {
        age: Some(age.round() as i64),
        height: Some(height),
        weight: Some(weight),
        gender: Some(gender.trim().to_string()),
    })
}

fn parse_record(
    expected: Category,
    obj: &Map<String, Value>,
) -> Result<HealthRecordDraft, ExtractionError> {
    if !expected.is_recordable() {
        return Err(ExtractionError::UnresolvedCategory);
    }
    let echoed = obj
        .get("category")
        .and_then(Value::as_str)
        .ok_or(ExtractionError::MissingField("category"))?;
    if Category::from_label(echoed) != Some(expected) {
        return Err(ExtractionError::CategoryMismatch {
            expected,
            actual: echoed.to_string(),
        });
    }
    let structured = obj
        .get("structured_json")
        .cloned()
        .ok_or(ExtractionError::MissingField("structured_json"))?;
    let payload = StructuredPayload::parse(expected, structured).map_err(|e| ExtractionError::Schema {
        category: expected,
        reason: e.to_string(),
    })?;
    let advice = obj
        .get("advice")
        .and_then(Value::as_str)
        .filter(|a| !a.trim().is_empty())
        .ok_or(ExtractionError::MissingField("advice"))?;
    Ok(HealthRecordDraft {
        category: expected,
        payload,
        advice: advice.to_string(),
    })
}

/// Validates a raw model response against the contract category.
pub fn parse_response(expected: Category, raw: &str) -> Result<Extraction, ExtractionError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| ExtractionError::InvalidJson(e.to_string()))?;
    let Value::Object(obj) = value else {
        return Err(ExtractionError::InvalidJson("top level is not an object".to_string()));
    };
    match obj.get("intent").and_then(Value::as_str) {
        Some("update_profile") => parse_profile(&obj).map(Extraction::ProfileUpdate),
        Some("health_record") => parse_record(expected, &obj).map(Extraction::HealthRecord),
        Some(other) if !expected.is_recordable() => {
            info!(intent = %other, "Extraction: no category and no profile data");
            Err(ExtractionError::UnresolvedCategory)
        }
        Some(other) => Err(ExtractionError::UnknownIntent(other.to_string())),
        None => Err(ExtractionError::MissingField("intent")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn diet_record(category: &str) -> String {
        json!({
            "intent": "health_record",
            "category": category,
            "structured_json": {
                "items": "漢堡、珍珠奶茶",
                "calories": 1050,
                "macros": {"carbs_g": 130, "protein_g": 30, "fat_g": 45},
                "sodium_mg": 1100,
                "total_calories": 1050
            },
            "advice": "熱量推估：漢堡 = 500kcal"
        })
        .to_string()
    }

    #[test]
    fn test_profile_update() {
        let raw = r#"{"intent":"update_profile","height":"165","weight":50,"age":25,"gender":"女"}"#;
        let Extraction::ProfileUpdate(m) = parse_response(Category::Unknown, raw).unwrap() else {
            panic!("expected profile update")
        };
        assert_eq!(m.height, Some(165.0));
        assert_eq!(m.age, Some(25));
        assert_eq!(m.gender.as_deref(), Some("女"));
    }

    #[test]
    fn test_profile_missing_field() {
        let raw = r#"{"intent":"update_profile","height":165,"weight":50,"gender":"女"}"#;
        assert!(matches!(
            parse_response(Category::Diet, raw),
            Err(ExtractionError::MissingField("age"))
        ));
    }

    #[test]
    fn test_health_record_matching_category() {
        let r = parse_response(Category::Diet, &diet_record("飲食")).unwrap();
        assert!(matches!(r, Extraction::HealthRecord(HealthRecordDraft { category: Category::Diet, .. })));
    }

    #[test]
    fn test_wrong_category_echo_is_rejected() {
        assert!(matches!(
            parse_response(Category::Diet, &diet_record("睡眠")),
            Err(ExtractionError::CategoryMismatch { .. })
        ));
    }

    #[test]
    fn test_record_under_unknown_is_unresolved() {
        let err = parse_response(Category::Unknown, &diet_record("未知")).unwrap_err();
        assert!(err.is_unresolved());
        let err = parse_response(Category::Unknown, r#"{"intent":"unknown"}"#).unwrap_err();
        assert!(err.is_unresolved());
    }

    #[test]
    fn test_invalid_json_and_fences() {
        assert!(matches!(
            parse_response(Category::Diet, "not json"),
            Err(ExtractionError::InvalidJson(_))
        ));
        let fenced = format!("```json\n{}\n```", diet_record("飲食"));
        assert!(parse_response(Category::Diet, &fenced).is_ok());
    }

    #[test]
    fn test_schema_violation() {
        let raw = json!({
            "intent": "health_record",
            "category": "飲食",
            "structured_json": {"items": "漢堡"},
            "advice": "x"
        })
        .to_string();
        assert!(matches!(
            parse_response(Category::Diet, &raw),
            Err(ExtractionError::Schema { .. })
        ));
    }
}
