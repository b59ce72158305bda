//! Storage crate: profile rows and the append-only health log.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – UserProfileRecord, ProfileMetrics, HealthLogRecord, HealthLogQuery
//! - [`repository`] – ProfileStore / LogStore traits
//! - [`profile_repo`] – ProfileRepository (SQLite)
//! - [`health_log_repo`] – HealthLogRepository (SQLite)
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod health_log_repo;
mod models;
mod profile_repo;
mod repository;
mod sqlite_pool;


pub use error::StorageError;
pub use health_log_repo::HealthLogRepository;
pub use models::{HealthLogQuery, HealthLogRecord, ProfileMetrics, UserProfileRecord};
pub use profile_repo::ProfileRepository;
pub use repository::{LogStore, ProfileStore};
pub use sqlite_pool::SqlitePoolManager;
