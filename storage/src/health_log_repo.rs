//! Health log repository: append-only `health_logs` rows on SQLite.
//!
//! Rows are never updated or deleted; readers get them back oldest first.

use crate::error::StorageError;
use crate::models::{HealthLogQuery, HealthLogRecord};
use crate::repository::LogStore;
use crate::sqlite_pool::SqlitePoolManager;
use async_trait::async_trait;
use tracing::info;

#[derive(Clone)]
pub struct HealthLogRepository {
    pool_manager: SqlitePoolManager,
}

impl HealthLogRepository {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        Self::with_pool(pool_manager).await
    }

    pub async fn with_pool(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating health_logs table if not exist");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS health_logs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                category TEXT NOT NULL,
                raw_text TEXT NOT NULL,
                structured_data TEXT NOT NULL,
                ai_advice TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_health_logs_user_created ON health_logs(user_id, created_at)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl LogStore for HealthLogRepository {
    async fn append(&self, record: &HealthLogRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO health_logs (id, user_id, category, raw_text, structured_data, ai_advice, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.category)
        .bind(&record.raw_text)
        .bind(&record.structured_data)
        .bind(&record.ai_advice)
        .bind(record.created_at)
        .execute(self.pool_manager.pool())
        .await?;

        info!(
            id = %record.id,
            user_id = %record.user_id,
            category = %record.category,
            "Appended health log entry"
        );
        Ok(())
    }

    async fn find_entries(&self, query: &HealthLogQuery) -> Result<Vec<HealthLogRecord>, StorageError> {
        let mut sql = String::from(
            "SELECT id, user_id, category, raw_text, structured_data, ai_advice, created_at \
             FROM health_logs WHERE user_id = ? AND created_at >= ?",
        );
        if query.category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if query.end.is_some() {
            sql.push_str(" AND created_at < ?");
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut query_builder = sqlx::query_as::<_, HealthLogRecord>(&sql)
            .bind(&query.user_id)
            .bind(query.start);
        if let Some(ref category) = query.category {
            query_builder = query_builder.bind(category);
        }
        if let Some(end) = query.end {
            query_builder = query_builder.bind(end);
        }

        let entries = query_builder.fetch_all(self.pool_manager.pool()).await?;
        info!(
            user_id = %query.user_id,
            category = ?query.category,
            count = entries.len(),
            "Retrieved health log entries"
        );
        Ok(entries)
    }
}
