//! Tolerant field readers for model output: numbers may arrive as `"45g"`, texts as lists.
//!
//! Each reader still requires its key to be present, since `deserialize_with` disables serde's
//! implicit `None` for absent `Option` fields.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parses the leading decimal number of `s` (`"650 kcal"` → 650). `None` when there is none.
pub fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let mut end = 0;
    for (i, c) in s.char_indices() {
        let sign = i == 0 && (c == '-' || c == '+');
        if c.is_ascii_digit() || c == '.' || sign {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    s[..end].parse().ok()
}

/// Numeric reading of a JSON value: numbers as-is, strings by their leading number.
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(s),
        _ => None,
    }
}

/// Text reading of a JSON value. Lists of strings are joined with `、`; null is empty.
pub fn text_from_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(text_from_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("、"),
        other => other.to_string(),
    }
}

pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    number_from_value(&value)
        .ok_or_else(|| D::Error::custom(format!("expected a number, got {}", value)))
}

/// Null or a blank string reads as `None`; any other value must carry a number.
pub fn optional_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        _ => number_from_value(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected a number or null, got {}", value))),
    }
}

pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(text_from_value(&value))
}

pub fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let text = text_from_value(&value);
    Ok(if text.trim().is_empty() || text.trim() == "null" {
        None
    } else {
        Some(text)
    })
}

pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "是" => Ok(true),
            "false" | "否" | "" => Ok(false),
            _ => Err(D::Error::custom(format!("expected a boolean, got {}", value))),
        },
        _ => Err(D::Error::custom(format!("expected a boolean, got {}", value))),
    }
}
