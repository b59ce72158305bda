//! User profile row. Metrics are nullable: a row can exist before the user ever states them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfileRecord {
    pub user_id: String,
    pub age: Option<i64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: Option<String>,
    /// Pending logging category label, `None` when idle.
    pub current_state: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

/// The four metrics carried by a profile-update intent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileMetrics {
    pub age: Option<i64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: Option<String>,
}
