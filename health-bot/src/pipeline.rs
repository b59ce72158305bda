//! One free-text turn: resolve category → retrieve knowledge → aggregate → assemble → extract →
//! persist → reply.
//!
//! Failures never escape: each degrades to a retry or clarification reply, and the pending
//! category is cleared only after the log insert is confirmed.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use storage::{HealthLogRecord, LogStore, ProfileMetrics, ProfileStore, StorageError};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::advice::{normalize_advice, RECORD_TIME_FORMAT};
use crate::aggregate::{daily_stats, format_number, DailyStats};
use crate::category::{classify, Category};
use crate::chronic::{self, StoredMeasures, SEPARATOR};
use crate::contract::{assemble, ContextInputs};
use crate::extraction::{Extraction, ExtractionError, ExtractionGateway, HealthRecordDraft};
use crate::knowledge::KnowledgeStore;
use crate::payload::StructuredPayload;
use crate::profile::render_profile;
use crate::state::ConversationStateMachine;

pub const SYSTEM_BUSY_REPLY: &str = "系統繁忙，請稍後再試。";
pub const CLARIFY_REPLY: &str = "抱歉，我無法分析這筆紀錄。請試著點選功能選單，並依照提示輸入喔！";

/// Result of one turn, each variant carrying the reply to send.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    ProfileUpdated { metrics: ProfileMetrics, reply: String },
    Recorded { category: Category, reply: String },
    /// Nothing was applied; the user should try again.
    Retry { reply: String },
    /// No category could be resolved for the text.
    Clarify { reply: String },
}

impl TurnOutcome {
    pub fn reply(&self) -> &str {
        match self {
            TurnOutcome::ProfileUpdated { reply, .. }
            | TurnOutcome::Recorded { reply, .. }
            | TurnOutcome::Retry { reply }
            | TurnOutcome::Clarify { reply } => reply,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TurnOutcome::ProfileUpdated { .. } => "profile_updated",
            TurnOutcome::Recorded { .. } => "recorded",
            TurnOutcome::Retry { .. } => "retry",
            TurnOutcome::Clarify { .. } => "clarify",
        }
    }

    fn retry() -> Self {
        TurnOutcome::Retry {
            reply: SYSTEM_BUSY_REPLY.to_string(),
        }
    }
}

#[derive(Debug, Error)]
enum TurnError {
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error("extraction: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("payload serialization: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn format_optional(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_default()
}

pub fn profile_reply(metrics: &ProfileMetrics) -> String {
    format!(
        "✅ 檔案已更新：\n身高：{}cm\n體重：{}kg\n年齡：{}歲\n性別：{}",
        format_optional(metrics.height),
        format_optional(metrics.weight),
        metrics.age.map(|a| a.to_string()).unwrap_or_default(),
        metrics.gender.as_deref().unwrap_or_default()
    )
}

pub fn record_reply(category: Category, advice: &str) -> String {
    format!("{} 紀錄成功！\n{}\n{}", category.label(), SEPARATOR, advice)
}

pub struct HealthPipeline {
    profiles: Arc<dyn ProfileStore>,
    logs: Arc<dyn LogStore>,
    knowledge: KnowledgeStore,
    gateway: ExtractionGateway,
    state: Arc<ConversationStateMachine>,
}

impl HealthPipeline {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        logs: Arc<dyn LogStore>,
        knowledge: KnowledgeStore,
        gateway: ExtractionGateway,
        state: Arc<ConversationStateMachine>,
    ) -> Self {
        Self {
            profiles,
            logs,
            knowledge,
            gateway,
            state,
        }
    }

    pub async fn process(&self, user_id: &str, text: &str) -> TurnOutcome {
        self.process_at(user_id, text, Local::now().naive_local()).await
    }

    /// Runs one turn as of `now` (local wall-clock time), holding the user's turn lock throughout.
    #[instrument(skip(self, text))]
    pub async fn process_at(&self, user_id: &str, text: &str, now: NaiveDateTime) -> TurnOutcome {
        let _turn = self.state.lock(user_id).await;
        match self.run_turn(user_id, text, now).await {
            Ok(outcome) => outcome,
            Err(TurnError::Extraction(e)) if e.is_unresolved() => {
                info!(user_id = %user_id, "No resolvable category, asking for clarification");
                TurnOutcome::Clarify {
                    reply: CLARIFY_REPLY.to_string(),
                }
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Turn failed, nothing applied");
                TurnOutcome::retry()
            }
        }
    }

    async fn run_turn(
        &self,
        user_id: &str,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<TurnOutcome, TurnError> {
        let pending = self.state.current(user_id).await?.pending();
        let category = classify(text, pending);
        info!(user_id = %user_id, category = %category, pending = ?pending, "step: category resolved");

        let retrieval = self.knowledge.retrieve(category, text).await;
        let daily = if category.is_recordable() {
            daily_stats(self.logs.as_ref(), user_id, category, now).await?
        } else {
            DailyStats::empty()
        };
        if !daily.skipped.is_empty() || !daily.anomalies.is_empty() {
            warn!(
                skipped = daily.skipped.len(),
                anomalies = daily.anomalies.len(),
                "Daily aggregate had unusable rows"
            );
        }

        let profile = self.profiles.find_profile(user_id).await?;
        let record_time = now.format(RECORD_TIME_FORMAT).to_string();
        let knowledge_text = retrieval.render();
        let profile_text = render_profile(profile.as_ref());
        let contract = assemble(&ContextInputs {
            category,
            record_time: &record_time,
            knowledge: &knowledge_text,
            daily: &daily,
            profile: &profile_text,
        });

        match self.gateway.extract(&contract, text).await? {
            Extraction::ProfileUpdate(metrics) => {
                self.profiles.upsert_metrics(user_id, &metrics).await?;
                info!(user_id = %user_id, "step: profile updated");
                Ok(TurnOutcome::ProfileUpdated {
                    reply: profile_reply(&metrics),
                    metrics,
                })
            }
            Extraction::HealthRecord(draft) => {
                let stored = StoredMeasures {
                    height_cm: profile.as_ref().and_then(|p| p.height),
                    weight_kg: profile.as_ref().and_then(|p| p.weight),
                };
                let (payload, advice) =
                    finalize_record(draft, &daily, &stored, retrieval.document(), &record_time);

                let record = HealthLogRecord::new(
                    user_id,
                    category.label(),
                    text,
                    payload.to_value()?.to_string(),
                    advice.clone(),
                )
                .with_created_at(now);
                self.logs.append(&record).await?;
                info!(user_id = %user_id, category = %category, entry_id = %record.id, "step: record inserted");

                if let Err(e) = self.state.complete(user_id).await {
                    warn!(user_id = %user_id, error = %e, "Record saved but pending category not cleared");
                }

                Ok(TurnOutcome::Recorded {
                    category,
                    reply: record_reply(category, &advice),
                })
            }
        }
    }
}

/// Applies the in-code policies to an extracted record and frames its advice.
fn finalize_record(
    draft: HealthRecordDraft,
    daily: &DailyStats,
    stored: &StoredMeasures,
    knowledge: Option<&serde_json::Value>,
    record_time: &str,
) -> (StructuredPayload, String) {
    match draft.payload {
        StructuredPayload::Diet(mut diet) => {
            diet.total_calories = Some(daily.total + diet.calories);
            (
                StructuredPayload::Diet(diet),
                normalize_advice(&draft.advice, record_time),
            )
        }
        StructuredPayload::Chronic(mut payload) => {
            chronic::finalize(&mut payload, stored, knowledge);
            let advice = normalize_advice(&chronic::render_advice(&payload, record_time), record_time);
            (StructuredPayload::Chronic(payload), advice)
        }
        other => (other, normalize_advice(&draft.advice, record_time)),
    }
}
