//! Health log row. `structured_data` is stored as raw JSON text and parsed by readers,
//! which must tolerate rows that no longer parse.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HealthLogRecord {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub raw_text: String,
    pub structured_data: String,
    pub ai_advice: String,
    /// Local wall-clock time of insertion.
    pub created_at: NaiveDateTime,
}

impl HealthLogRecord {
    /// Creates a new record with a generated UUID and the current local time.
    pub fn new(
        user_id: impl Into<String>,
        category: impl Into<String>,
        raw_text: impl Into<String>,
        structured_data: impl Into<String>,
        ai_advice: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            category: category.into(),
            raw_text: raw_text.into(),
            structured_data: structured_data.into(),
            ai_advice: ai_advice.into(),
            created_at: Local::now().naive_local(),
        }
    }

    pub fn with_created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = created_at;
        self
    }
}
