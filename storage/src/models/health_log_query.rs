//! Filter for reading back health log entries.
//!
//! Used by LogStore::find_entries. `start` is inclusive, `end` exclusive.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthLogQuery {
    pub user_id: String,
    pub category: Option<String>,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
}

impl HealthLogQuery {
    pub fn since(user_id: impl Into<String>, start: NaiveDateTime) -> Self {
        Self {
            user_id: user_id.into(),
            category: None,
            start,
            end: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn until(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }
}
