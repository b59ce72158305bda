//! Profile repository: keyed `user_profiles` rows on SQLite.
//!
//! Holds the physiological metrics and the pending conversation category per user.

use crate::error::StorageError;
use crate::models::{ProfileMetrics, UserProfileRecord};
use crate::repository::ProfileStore;
use crate::sqlite_pool::SqlitePoolManager;
use async_trait::async_trait;
use chrono::Local;
use tracing::info;

#[derive(Clone)]
pub struct ProfileRepository {
    pool_manager: SqlitePoolManager,
}

impl ProfileRepository {
    /// Opens its own pool on `database_url` and creates the table.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        Self::with_pool(pool_manager).await
    }

    /// Shares an existing pool (one database file for profiles and logs).
    pub async fn with_pool(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating user_profiles table if not exist");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_profiles (
                user_id TEXT PRIMARY KEY,
                age INTEGER,
                height REAL,
                weight REAL,
                gender TEXT,
                current_state TEXT,
                updated_at TEXT
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn find_profile(&self, user_id: &str) -> Result<Option<UserProfileRecord>, StorageError> {
        let profile = sqlx::query_as::<_, UserProfileRecord>(
            "SELECT user_id, age, height, weight, gender, current_state, updated_at FROM user_profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;

        Ok(profile)
    }

    async fn upsert_metrics(&self, user_id: &str, metrics: &ProfileMetrics) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, age, height, weight, gender, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                age = excluded.age,
                height = excluded.height,
                weight = excluded.weight,
                gender = excluded.gender,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(metrics.age)
        .bind(metrics.height)
        .bind(metrics.weight)
        .bind(&metrics.gender)
        .bind(Local::now().naive_local())
        .execute(self.pool_manager.pool())
        .await?;

        info!(user_id = %user_id, "Upserted profile metrics");
        Ok(())
    }

    async fn pending_category(&self, user_id: &str) -> Result<Option<String>, StorageError> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT current_state FROM user_profiles WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(self.pool_manager.pool())
                .await?;

        Ok(row
            .and_then(|(state,)| state)
            .filter(|state| !state.is_empty()))
    }

    async fn set_pending_category(
        &self,
        user_id: &str,
        category: Option<&str>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, current_state)
            VALUES (?, ?)
            ON CONFLICT(user_id) DO UPDATE SET current_state = excluded.current_state
            "#,
        )
        .bind(user_id)
        .bind(category)
        .execute(self.pool_manager.pool())
        .await?;

        info!(user_id = %user_id, pending = ?category, "Pending category written");
        Ok(())
    }
}
