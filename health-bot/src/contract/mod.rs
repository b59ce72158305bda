//! Context assembler: builds the instruction contract for one extraction turn.
//!
//! The system instruction is a list of titled [`PromptSection`]s (role, alignment rules, category
//! rules, background data, output contract, style). Category-specific rules, advice templates and
//! JSON shapes live in the per-category submodules.

mod chronic;
mod diet;
mod sleep;

use prompt::{format_sections, instruction_messages, ChatMessage, PromptSection};

use crate::advice::{record_header, DISCLAIMER, MAX_ADVICE_CHARS};
use crate::aggregate::{format_number, DailyStats};
use crate::category::Category;

/// Everything the assembler merges for one turn.
#[derive(Debug, Clone)]
pub struct ContextInputs<'a> {
    pub category: Category,
    /// `YYYY-MM-DD HH:MM`.
    pub record_time: &'a str,
    /// Rendered knowledge string (may be empty).
    pub knowledge: &'a str,
    pub daily: &'a DailyStats,
    /// Rendered profile text.
    pub profile: &'a str,
}

/// System instruction plus the facts the response is validated against.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionContract {
    /// Category the prompt was built for; a health record must echo it.
    pub category: Category,
    pub record_time: String,
    /// Today's aggregate injected into the prompt.
    pub daily_total: f64,
    pub system_instruction: String,
}

impl InstructionContract {
    pub fn messages(&self, user_text: &str) -> Vec<ChatMessage> {
        instruction_messages(&self.system_instruction, user_text)
    }
}

struct CategoryRules {
    logic: String,
    advice_template: String,
    json_shape: &'static str,
}

fn category_rules(inputs: &ContextInputs<'_>) -> Option<CategoryRules> {
    match inputs.category {
        Category::Diet => Some(CategoryRules {
            logic: diet::logic(inputs.daily.total),
            advice_template: diet::ADVICE_TEMPLATE.to_string(),
            json_shape: diet::JSON_SHAPE,
        }),
        Category::Sleep => Some(CategoryRules {
            logic: sleep::LOGIC.to_string(),
            advice_template: sleep::ADVICE_TEMPLATE.to_string(),
            json_shape: sleep::JSON_SHAPE,
        }),
        Category::Chronic => Some(CategoryRules {
            logic: chronic::LOGIC.to_string(),
            advice_template: chronic::advice_template(inputs.record_time),
            json_shape: chronic::JSON_SHAPE,
        }),
        Category::Unknown => None,
    }
}

fn alignment_rules(inputs: &ContextInputs<'_>) -> String {
    format!(
        "1. 判定必須 100% 引用『知識庫』內容，嚴禁編造知識庫中不存在的數據或建議。\n\
         2. 必須直接引用『用戶背景』中的系統鎖定數值，不得自行重算 BMR/TDEE。\n\
         3. 術語在地化：TDEE 稱為『每日建議攝取總熱量』，BMR 稱為『基礎代謝率』。\n\
         4. 現在時間是 {}。\n\
         5. 今日已累計數值由系統計算，直接引用，不得重新計算，也不得刪除或合併任何歷史紀錄（即使內容重複，也視為不同餐次）。",
        inputs.record_time
    )
}

fn background(inputs: &ContextInputs<'_>) -> String {
    let knowledge = if inputs.knowledge.is_empty() {
        "（無）"
    } else {
        inputs.knowledge
    };
    format!(
        "- 知識庫：{}\n- 今日歷史：{}\n- 今日已累計：{}\n- 用戶背景：{}",
        knowledge,
        inputs.daily.digest,
        format_number(inputs.daily.total),
        inputs.profile
    )
}

const PROFILE_CONTRACT: &str = "若意圖為個人檔案更新：輸出 {\"intent\": \"update_profile\", \"height\": 數字(cm), \"weight\": 數字(kg), \"age\": 數字, \"gender\": \"男\" 或 \"女\"}。";

fn output_contract(inputs: &ContextInputs<'_>, rules: Option<&CategoryRules>) -> String {
    match rules {
        Some(rules) => format!(
            "1. {}\n\
             2. 若意圖為健康紀錄：輸出鍵 \"intent\"(固定為 \"health_record\")、\"category\"、\"structured_json\"、\"advice\"。\n\
             - \"category\" 必須固定填入 \"{}\"，嚴禁更動。\n\
             - \"structured_json\" 必須嚴格遵守此結構，不得增減鍵值：{}\n\
             - \"advice\" 以『{}』開頭並套用：{}",
            PROFILE_CONTRACT,
            inputs.category.label(),
            rules.json_shape,
            record_header(inputs.record_time),
            rules.advice_template
        ),
        None => format!(
            "1. {}\n2. 目前無法判定紀錄類別，嚴禁輸出 health_record；若輸入不是個人檔案資料，輸出 {{\"intent\": \"unknown\"}}。",
            PROFILE_CONTRACT
        ),
    }
}

fn style_rules() -> String {
    format!(
        "一律使用繁體中文，嚴禁簡體字與 Markdown。advice 限 {} 字以內，禁止贅字。advice 結尾空兩行加上免責聲明：『{}』",
        MAX_ADVICE_CHARS, DISCLAIMER
    )
}

/// Builds the contract for one turn. The injected daily total is always the aggregate's value.
pub fn assemble(inputs: &ContextInputs<'_>) -> InstructionContract {
    let rules = category_rules(inputs);
    let role = match inputs.category {
        Category::Unknown => "你是整合 RAG 知識庫的專業健康管家。請判斷用戶輸入是否為個人檔案更新，並輸出 JSON。".to_string(),
        c => format!(
            "你是整合 RAG 知識庫並具備長期數據連貫性的專業健康管家。請針對【{}】類別進行分析並輸出 JSON。",
            c.label()
        ),
    };

    let mut sections = vec![
        PromptSection::new("角色", role),
        PromptSection::new("最高法律：RAG 與數據對齊", alignment_rules(inputs)),
    ];
    if let Some(rules) = &rules {
        sections.push(PromptSection::new("類別規則", rules.logic.clone()));
    }
    sections.push(PromptSection::new("背景數據", background(inputs)));
    sections.push(PromptSection::new(
        "輸出格式規範",
        output_contract(inputs, rules.as_ref()),
    ));
    sections.push(PromptSection::new("語言與長度", style_rules()));

    InstructionContract {
        category: inputs.category,
        record_time: inputs.record_time.to_string(),
        daily_total: inputs.daily.total,
        system_instruction: format_sections(&sections),
    }
}
