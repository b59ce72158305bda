//! Row models for `user_profiles` and `health_logs`.

mod health_log_query;
mod health_log_record;
mod profile_record;

pub use health_log_query::HealthLogQuery;
pub use health_log_record::HealthLogRecord;
pub use profile_record::{ProfileMetrics, UserProfileRecord};
