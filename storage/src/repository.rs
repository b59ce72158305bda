//! Store seams used by the assistant: keyed profile rows and the append-only log.
//!
//! The pipeline depends on these traits only, so tests and alternative engines can stand in for SQLite.

use crate::error::StorageError;
use crate::models::{HealthLogQuery, HealthLogRecord, ProfileMetrics, UserProfileRecord};
use async_trait::async_trait;

/// Keyed user profile rows (physiological metrics + pending conversation category).
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile(&self, user_id: &str) -> Result<Option<UserProfileRecord>, StorageError>;

    /// Last-writer-wins upsert of the four metrics; refreshes `updated_at`, leaves the pending category alone.
    async fn upsert_metrics(&self, user_id: &str, metrics: &ProfileMetrics) -> Result<(), StorageError>;

    async fn pending_category(&self, user_id: &str) -> Result<Option<String>, StorageError>;

    /// Sets (`Some`) or clears (`None`) the pending category, creating the row lazily.
    async fn set_pending_category(
        &self,
        user_id: &str,
        category: Option<&str>,
    ) -> Result<(), StorageError>;
}

/// Append-only per-user health entries.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn append(&self, record: &HealthLogRecord) -> Result<(), StorageError>;

    /// Entries matching the query, oldest first.
    async fn find_entries(&self, query: &HealthLogQuery) -> Result<Vec<HealthLogRecord>, StorageError>;
}
