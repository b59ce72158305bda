//! End-to-end turns through HealthPipeline with a scripted model and in-memory SQLite.

use health_bot::pipeline::{CLARIFY_REPLY, SYSTEM_BUSY_REPLY};
use health_bot::state::ConversationState;
use health_bot::{Category, KnowledgeStore, TurnOutcome};
use serde_json::{json, Value};
use storage::{HealthLogQuery, HealthLogRecord};
use tempfile::TempDir;

mod support;
use support::{at, Harness};

const USER: &str = "10001";

fn diet_reply(items: &str, calories: f64) -> String {
    json!({
        "intent": "health_record",
        "category": "飲食",
        "structured_json": {
            "items": items,
            "calories": calories,
            "macros": {"carbs_g": 130, "protein_g": 30, "fat_g": 45},
            "sodium_mg": 1100,
            "total_calories": 0
        },
        "advice": "熱量推估：漢堡 = 500kcal，珍珠奶茶 = 650kcal\n今日累計已達標準的一半，晚餐以蔬菜為主。"
    })
    .to_string()
}

fn sleep_reply() -> String {
    json!({
        "intent": "health_record",
        "category": "睡眠",
        "structured_json": {
            "detected_metrics": {
                "hours": 8,
                "sleep_latency_min": 30,
                "waso_min": null,
                "efficiency_score": 94
            },
            "quality_assessment": {"level": "良好", "primary_dimension": "入睡時間"},
            "feature_detection": {
                "snoring_osa_risk": null,
                "caffeine_impact": null,
                "alcohol_rebound": null,
                "dreaming_stage": null
            }
        },
        "advice": "🌙 睡眠時數：8 小時，符合 18-64 歲建議。"
    })
    .to_string()
}

fn chronic_reply() -> String {
    json!({
        "intent": "health_record",
        "category": "慢性病",
        "structured_json": {
            "blood_pressure": {"value": "145/95", "status": "第二期高血壓", "emoji": "🔴", "is_alert": true},
            "heart_rate": {"value": "72", "status": "正常", "emoji": "🟢", "is_alert": false},
            "blood_sugar": {"value": "", "status": "", "emoji": "", "is_alert": false},
            "BMI": {"value": "", "status": "", "emoji": "", "is_alert": false},
            "dash_section": "",
            "metabolic_alert": "",
            "reported_weight_kg": null
        },
        "advice": "ignored"
    })
    .to_string()
}

fn profile_reply() -> String {
    json!({
        "intent": "update_profile",
        "height": 165,
        "weight": "50.5",
        "age": 25,
        "gender": "女"
    })
    .to_string()
}

async fn entries(h: &Harness) -> Vec<HealthLogRecord> {
    h.logs
        .find_entries(&HealthLogQuery::since(USER, at("2000-01-01 00:00:00")))
        .await
        .unwrap()
}

/// **Test: A diet turn without a pending category is keyword-classified, stored with the daily running total, and answered with the framed advice.**
#[tokio::test]
async fn diet_turn_records_running_total() {
    let h = Harness::new().await;
    h.llm.push_reply(diet_reply("早餐蛋餅", 250.0));
    h.llm.push_reply(diet_reply("漢堡、珍珠奶茶", 1150.0));

    let first = h
        .pipeline
        .process_at(USER, "早餐吃了蛋餅", at("2026-10-18 08:00:00"))
        .await;
    assert!(matches!(first, TurnOutcome::Recorded { category: Category::Diet, .. }));

    let outcome = h
        .pipeline
        .process_at(USER, "午餐吃了一個漢堡和一杯珍奶", at("2026-10-18 12:30:00"))
        .await;

    let TurnOutcome::Recorded { category, reply } = outcome else {
        panic!("expected a recorded turn, got {:?}", outcome);
    };
    assert_eq!(category, Category::Diet);
    assert!(reply.starts_with("飲食 紀錄成功！\n━━━━━━━━━━━━━━\n【紀錄日期】 2026-10-18 12:30\n"));
    assert!(reply.ends_with("⚠️ 以上內容僅供參考，不構成醫療診斷。"));

    // The second prompt carried the first meal's total and the diet reference document.
    let prompt = h.llm.last_system_prompt();
    assert!(prompt.contains("目前今日已累計：250 kcal"));
    assert!(prompt.contains("calorie_estimation_reference"));

    let stored = entries(&h).await;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].category, "飲食");
    assert_eq!(stored[1].raw_text, "午餐吃了一個漢堡和一杯珍奶");
    let data: Value = serde_json::from_str(&stored[1].structured_data).unwrap();
    assert_eq!(data["calories"], json!(1150.0));
    assert_eq!(data["total_calories"], json!(1400.0));
}

/// **Test: Yesterday's diet rows do not count toward today's total.**
#[tokio::test]
async fn daily_total_is_scoped_to_local_day() {
    let h = Harness::new().await;
    h.llm.push_reply(diet_reply("宵夜", 600.0));
    h.llm.push_reply(diet_reply("早餐", 300.0));

    h.pipeline
        .process_at(USER, "宵夜吃了鹹酥雞", at("2026-10-17 23:30:00"))
        .await;
    h.pipeline
        .process_at(USER, "早餐吃了飯糰", at("2026-10-18 07:30:00"))
        .await;

    assert!(h.llm.last_system_prompt().contains("目前今日已累計：0 kcal"));
    let stored = entries(&h).await;
    let data: Value = serde_json::from_str(&stored[1].structured_data).unwrap();
    assert_eq!(data["total_calories"], json!(300.0));
}

/// **Test: A pending category overrides keywords and is cleared only after the record is stored.**
#[tokio::test]
async fn pending_sleep_category_is_used_then_cleared() {
    let h = Harness::new().await;
    h.state.select(USER, Category::Sleep).await.unwrap();
    h.llm.push_reply(sleep_reply());

    // No sleep keyword here; the pending mode decides.
    let outcome = h
        .pipeline
        .process_at(USER, "12點躺下，早上8點起來，精神很好", at("2026-10-18 09:00:00"))
        .await;

    assert!(matches!(outcome, TurnOutcome::Recorded { category: Category::Sleep, .. }));
    assert_eq!(h.state.current(USER).await.unwrap(), ConversationState::Idle);
    assert_eq!(entries(&h).await[0].category, "睡眠");
}

/// **Test: A model reply violating the category shape is rejected: nothing stored, pending kept, retry reply.**
#[tokio::test]
async fn schema_violation_keeps_pending_and_asks_retry() {
    let h = Harness::new().await;
    h.state.select(USER, Category::Sleep).await.unwrap();
    // Diet-shaped payload under the sleep contract.
    h.llm.push_reply(diet_reply("漢堡", 500.0).replace("飲食", "睡眠"));

    let outcome = h
        .pipeline
        .process_at(USER, "昨晚睡了七小時", at("2026-10-18 09:00:00"))
        .await;

    assert_eq!(
        outcome,
        TurnOutcome::Retry {
            reply: SYSTEM_BUSY_REPLY.to_string()
        }
    );
    assert!(entries(&h).await.is_empty());
    assert_eq!(
        h.state.current(USER).await.unwrap(),
        ConversationState::Pending(Category::Sleep)
    );
}

/// **Test: A transport failure or non-JSON reply degrades to the retry reply without side effects.**
#[tokio::test]
async fn transport_and_json_failures_are_retries() {
    let h = Harness::new().await;
    h.llm.push_failure("connection reset");
    h.llm.push_reply("抱歉我不知道");

    for _ in 0..2 {
        let outcome = h
            .pipeline
            .process_at(USER, "午餐吃了便當", at("2026-10-18 12:00:00"))
            .await;
        assert_eq!(outcome.reply(), SYSTEM_BUSY_REPLY);
    }
    assert!(entries(&h).await.is_empty());
}

/// **Test: A profile update upserts the metrics, replies with the summary and leaves the pending category alone.**
#[tokio::test]
async fn profile_update_does_not_touch_pending() {
    let h = Harness::new().await;
    h.state.select(USER, Category::Chronic).await.unwrap();
    h.llm.push_reply(profile_reply());

    let outcome = h
        .pipeline
        .process_at(USER, "165公分、50.5公斤、25歲、女", at("2026-10-18 10:00:00"))
        .await;

    assert_eq!(
        outcome.reply(),
        "✅ 檔案已更新：\n身高：165cm\n體重：50.5kg\n年齡：25歲\n性別：女"
    );
    let profile = h.profiles.find_profile(USER).await.unwrap().unwrap();
    assert_eq!(profile.age, Some(25));
    assert_eq!(profile.weight, Some(50.5));
    assert_eq!(
        h.state.current(USER).await.unwrap(),
        ConversationState::Pending(Category::Chronic)
    );
    assert!(entries(&h).await.is_empty());
}

/// **Test: Text with no category and no profile data gets the clarification reply.**
#[tokio::test]
async fn unknown_category_asks_for_clarification() {
    let h = Harness::new().await;
    h.llm.push_reply(r#"{"intent":"unknown"}"#);

    let outcome = h
        .pipeline
        .process_at(USER, "你好", at("2026-10-18 10:00:00"))
        .await;

    assert_eq!(
        outcome,
        TurnOutcome::Clarify {
            reply: CLARIFY_REPLY.to_string()
        }
    );
    assert!(h.llm.last_system_prompt().contains(r#"{"intent": "unknown"}"#));
}

/// **Test: A missing reference document still lets the turn complete.**
#[tokio::test]
async fn missing_knowledge_document_still_records() {
    let empty = TempDir::new().unwrap();
    let h = Harness::with_knowledge(KnowledgeStore::new(empty.path())).await;
    h.llm.push_reply(diet_reply("便當", 800.0));

    let outcome = h
        .pipeline
        .process_at(USER, "午餐吃了排骨便當", at("2026-10-18 12:00:00"))
        .await;

    assert!(matches!(outcome, TurnOutcome::Recorded { .. }));
    assert!(!h.llm.last_system_prompt().contains("參考之醫學指南標準"));
}

/// **Test: Chronic advice is rendered from the computed policy, not the model's advice text.**
#[tokio::test]
async fn chronic_turn_applies_policy_in_code() {
    let h = Harness::new().await;
    h.llm.push_reply(chronic_reply());

    let outcome = h
        .pipeline
        .process_at(USER, "血壓 145/95，心率 72", at("2026-10-18 07:00:00"))
        .await;

    let reply = outcome.reply().to_string();
    assert!(matches!(outcome, TurnOutcome::Recorded { category: Category::Chronic, .. }));
    assert!(!reply.contains("ignored"));
    assert!(reply.contains("🔴 血壓：145/95"));
    assert!(reply.contains("DASH"));

    let stored = entries(&h).await;
    let data: Value = serde_json::from_str(&stored[0].structured_data).unwrap();
    assert_eq!(data["blood_sugar"]["value"], json!("未紀錄"));
    assert_eq!(data["BMI"]["value"], json!("未紀錄"));
    assert_eq!(data["metabolic_alert"], json!(""));
    assert!(data["dash_section"].as_str().unwrap().contains("< 1500 mg"));
}
