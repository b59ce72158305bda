//! Diet rules: calorie lookup priority, macro estimation, running total.

use crate::aggregate::format_number;

pub(super) fn logic(daily_total: f64) -> String {
    let total = format_number(daily_total);
    format!(
        "1. 熱量判定優先級：先查知識庫 calorie_estimation_reference.common_items；名稱相符時必須直接使用該數值作為 calories，不得更改；不相符時才依醫學常識推估。\n\
         2. 營養素：估算本次食物的蛋白質(g)、碳水(g)、脂肪(g) 與鈉(mg)。\n\
         3. 統計：目前今日已累計：{total} kcal。total_calories = {total} + 本次 calories。"
    )
}

pub(super) const ADVICE_TEMPLATE: &str = "\
【飲食分析報告】
熱量推估：[食物名稱] = [本次數值]kcal
今日統計：總累計(含本次) [今日總計] / 每日建議攝取總熱量 [建議總量] kcal
━━━━━━━━━━
營養分析：
● 蛋白質：[克數]g / 碳水：[克數]g / 脂肪：[克數]g
● 鈉含量：[毫克]mg
● 代謝建議：[今日佔比與熱量、蛋白質、鈉的剩餘配額]";

pub(super) const JSON_SHAPE: &str = r#"{"items": "本次食物名稱，以、區隔", "calories": 本次熱量總和(數字), "macros": {"carbs_g": 碳水(克，數字或 null), "protein_g": 蛋白質(克，數字或 null), "fat_g": 脂肪(克，數字或 null)}, "sodium_mg": 鈉(毫克，數字或 null), "total_calories": 今日熱量加總(數字)}"#;
