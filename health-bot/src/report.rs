//! Weekly report: 7-day statistics computed in code, prose written by the model.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use llm_client::LlmClient;
use prompt::{format_sections, ChatMessage, PromptSection};
use storage::{LogStore, ProfileStore};
use tracing::{error, info, instrument};

use crate::advice::{normalize_report, DISCLAIMER};
use crate::aggregate::{format_number, weekly_summary, WeeklySummary};
use crate::profile::render_profile;

pub const REPORT_ACK: &str = "📊 正在彙整您過去 7 天的健康數據，請稍候...";
pub const NO_WEEKLY_RECORDS: &str = "📊 您本週尚無任何健康紀錄喔！";
pub const REPORT_FAILED: &str = "系統繁忙，週報生成失敗，請稍後再試。";

const REPORT_REQUEST: &str = "請產生我的本週健康週報。";

fn trajectory(values: &[String]) -> String {
    if values.is_empty() {
        "無".to_string()
    } else {
        values.join(", ")
    }
}

fn statistics(summary: &WeeklySummary) -> String {
    let chronic = &summary.chronic;
    format!(
        "- 飲食：總攝取 {} kcal，實際紀錄 {} 天，平均每日 {} kcal。\n\
         - 睡眠：實際紀錄 {} 天，平均每日睡 {} 小時。\n\
         - 慢性病：總測量 {} 筆，異常警告 {} 次，血壓軌跡：{}，心率軌跡：{}，血糖軌跡：{}。",
        format_number(summary.diet.total_calories),
        summary.diet.days,
        format_number(summary.diet.average_calories),
        summary.sleep.days,
        format_number(summary.sleep.average_hours),
        chronic.entries,
        chronic.alerts,
        trajectory(&chronic.blood_pressure),
        trajectory(&chronic.heart_rate),
        trajectory(&chronic.blood_sugar)
    )
}

const COMPARISON_RULES: &str = "\
1. 平均攝取低於 TDEE 時判定為「達標」或「低於建議量」並給予鼓勵；高於 TDEE 才可判定為「過高」。
2. 嚴禁把小於 TDEE 的數值描述為偏高；數值大小以數學比較為準。
3. 嚴禁自行重新計算平均值，必須直接引用本週精確統計。";

const STRUCTURE: &str = "\
[健康分析週報]
━━━━━━━━━━
【飲食與營養 🍽️】
【睡眠品質 💤】
【慢性病追蹤 🩺】
【綜合生活洞察 🧠】
━━━━━━━━━━
● 下週行動建議 📝
1. ...
2. ...";

/// System prompt for the weekly report.
pub fn build_report_prompt(profile: &str, summary: &WeeklySummary) -> String {
    let sections = [
        PromptSection::new(
            "角色",
            "你是一位專業的健康顧問，請根據以下由系統計算的精確統計為用戶撰寫週報。",
        ),
        PromptSection::new("用戶生理背景", profile),
        PromptSection::new("本週精確統計", statistics(summary)),
        PromptSection::new("詳細紀錄明細", summary.details_json()),
        PromptSection::new("數值比較準則", COMPARISON_RULES),
        PromptSection::new("內容結構", STRUCTURE),
        PromptSection::new(
            "撰寫要求",
            format!(
                "繁體中文，嚴禁 Markdown，150-200 字內。慢性病需點評數值軌跡。結尾：{}",
                DISCLAIMER
            ),
        ),
    ];
    format_sections(&sections)
}

pub struct WeeklyReporter {
    profiles: Arc<dyn ProfileStore>,
    logs: Arc<dyn LogStore>,
    llm: Arc<dyn LlmClient>,
}

impl WeeklyReporter {
    pub fn new(profiles: Arc<dyn ProfileStore>, logs: Arc<dyn LogStore>, llm: Arc<dyn LlmClient>) -> Self {
        Self { profiles, logs, llm }
    }

    pub async fn generate(&self, user_id: &str) -> String {
        self.generate_at(user_id, Local::now().naive_local()).await
    }

    /// Report text for the 7 days before `now`; always returns something sendable.
    #[instrument(skip(self))]
    pub async fn generate_at(&self, user_id: &str, now: NaiveDateTime) -> String {
        let summary = match weekly_summary(self.logs.as_ref(), user_id, now).await {
            Ok(s) => s,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Weekly report: failed to load logs");
                return REPORT_FAILED.to_string();
            }
        };
        if summary.is_empty() {
            info!(user_id = %user_id, "Weekly report: no records in window");
            return NO_WEEKLY_RECORDS.to_string();
        }

        let profile = match self.profiles.find_profile(user_id).await {
            Ok(p) => p,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Weekly report: failed to load profile");
                return REPORT_FAILED.to_string();
            }
        };
        let system = build_report_prompt(&render_profile(profile.as_ref()), &summary);
        let messages = vec![ChatMessage::system(system), ChatMessage::user(REPORT_REQUEST)];

        match self.llm.complete(messages).await {
            Ok(text) if !text.trim().is_empty() => normalize_report(&text),
            Ok(_) => {
                error!(user_id = %user_id, "Weekly report: empty model reply");
                REPORT_FAILED.to_string()
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Weekly report: model call failed");
                REPORT_FAILED.to_string()
            }
        }
    }
}
