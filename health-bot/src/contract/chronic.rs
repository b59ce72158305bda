//! Chronic rules: metric isolation and tiering. BMI, the advisory section and the metabolic alert
//! are recomputed in code after extraction.

pub(super) const LOGIC: &str = "\
1. 指標隔離：用戶未提及的指標一律 value = \"未紀錄\"、status = \"-\"、emoji = \"⚪\"、is_alert = false，不得受其他異常指標影響。
2. 分級依知識庫標準：🟢 正常、🟡 偏高、🟠 異常、🔴 危險；is_alert 在非 🟢 時為 true。
3. 若用戶提到本次體重，填入 reported_weight_kg（數字），否則為 null。
4. dash_section、metabolic_alert 由系統依分級與知識庫產生，填空字串即可。
5. 找不到對應知識時，填寫「請持續觀察並定期測量」。";

pub(super) fn advice_template(record_time: &str) -> String {
    format!(
        "【紀錄日期】 {record_time}\n📊 檢測結果\n[血壓 emoji] 血壓：[數值] → [狀態]\n[心率 emoji] 心率：[數值] → [狀態]\n[血糖 emoji] 血糖：[數值] → [狀態]\n[BMI emoji] BMI：[數值] → [狀態]"
    )
}

pub(super) const JSON_SHAPE: &str = r#"{"blood_pressure": {"value": "收縮壓/舒張壓 或 未紀錄", "status": "分級", "emoji": "🟢/🟡/🟠/🔴/⚪", "is_alert": 布林}, "heart_rate": {"value": "數值 或 未紀錄", "status": "分級", "emoji": "🟢/🟡/🟠/🔴/⚪", "is_alert": 布林}, "blood_sugar": {"value": "數值(空腹/飯後) 或 未紀錄", "status": "分級", "emoji": "🟢/🟡/🟠/🔴/⚪", "is_alert": 布林}, "BMI": {"value": "數值 或 未紀錄", "status": "分級", "emoji": "🟢/🟡/🟠/🔴/⚪", "is_alert": 布林}, "dash_section": "", "metabolic_alert": "", "reported_weight_kg": 數字或 null}"#;
