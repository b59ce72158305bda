//! Fixed command texts and their canned replies. Matching is exact and case-sensitive.

use health_core::MenuOption;

use crate::category::Category;

pub const CMD_UPDATE_PROFILE: &str = "更新個人檔案";
pub const CMD_START_RECORDING: &str = "我要紀錄";
pub const CMD_WEEKLY_REPORT: &str = "查看健康報告";
const RECORD_PREFIX: &str = "【紀錄】";

pub const RECORD_MENU_PROMPT: &str = "請選擇紀錄類別：";

pub const PROFILE_GUIDE: &str = "【個人身體基準：為什麼這很重要？】\n\n\
為了提供更精準的科學建議，系統建議您提供基礎生理指標，這些資料將用於以下分析：\n\n\
🛌 睡眠：年齡是判斷睡眠結構與所需時數的關鍵變數。\n\n\
🥗 飲食：身高與體重可用來估算基礎代謝率（BMR），作為熱量與營養建議的依據。\n\n\
🩺 慢性病：基本生理特徵能幫助系統更準確辨識異常狀況，降低個體差異造成的誤判。\n\n\
請輸入您的「身高、體重、年齡、性別」\n（範例：165公分、50公斤、25歲、女）";

const SLEEP_PROMPT: &str = "已進入【睡眠紀錄】模式。\n\n\
請描述您昨晚的入睡/起床時間與品質（例如：昨晚12點躺下，大概30分鐘入睡，早上8點醒，精神很好）。\n\n\
💡 也可以輸入是否有打呼、攝取咖啡因、飲酒或做夢，這能幫助我更精準地分析您的睡眠品質喔！";

const DIET_PROMPT: &str = "已進入【飲食紀錄】模式。\n\n請描述您吃了什麼（例如：午餐吃了一個漢堡和一杯珍奶）。";

const CHRONIC_PROMPT: &str = "已進入【慢性病紀錄】模式。\n\n請提供測量數據，可包含血壓、心率或血糖，例如：\n\
「血壓 135/85，心率 72，血糖 110 (飯後)。」\n\n\
💡 若體重有變化也可以順便告訴我喔！";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    UpdateProfile,
    StartRecording,
    EnterCategory(Category),
    WeeklyReport,
}

impl Command {
    /// Recognizes a command text; anything else goes to the extraction pipeline.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            CMD_UPDATE_PROFILE => Some(Command::UpdateProfile),
            CMD_START_RECORDING => Some(Command::StartRecording),
            CMD_WEEKLY_REPORT => Some(Command::WeeklyReport),
            _ => text
                .strip_prefix(RECORD_PREFIX)
                .and_then(Category::from_label)
                .filter(Category::is_recordable)
                .filter(|c| text == record_command(*c))
                .map(Command::EnterCategory),
        }
    }
}

pub fn record_command(category: Category) -> String {
    format!("{}{}", RECORD_PREFIX, category.label())
}

/// The three category options shown after "我要紀錄".
pub fn record_menu() -> Vec<MenuOption> {
    vec![
        MenuOption::new("睡眠追蹤", record_command(Category::Sleep)),
        MenuOption::new("飲食與營養", record_command(Category::Diet)),
        MenuOption::new("慢性病紀錄", record_command(Category::Chronic)),
    ]
}

pub fn category_prompt(category: Category) -> &'static str {
    match category {
        Category::Sleep => SLEEP_PROMPT,
        Category::Diet => DIET_PROMPT,
        Category::Chronic => CHRONIC_PROMPT,
        Category::Unknown => RECORD_MENU_PROMPT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixed_commands() {
        assert_eq!(Command::parse("更新個人檔案"), Some(Command::UpdateProfile));
        assert_eq!(Command::parse("我要紀錄"), Some(Command::StartRecording));
        assert_eq!(Command::parse("查看健康報告"), Some(Command::WeeklyReport));
        assert_eq!(
            Command::parse("【紀錄】睡眠"),
            Some(Command::EnterCategory(Category::Sleep))
        );
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(Command::parse(" 我要紀錄"), None);
        assert_eq!(Command::parse("【紀錄】 睡眠"), None);
        assert_eq!(Command::parse("【紀錄】運動"), None);
        assert_eq!(Command::parse("【紀錄】未知"), None);
        assert_eq!(Command::parse("午餐吃了便當"), None);
    }

    #[test]
    fn test_menu_options_round_trip_to_commands() {
        let menu = record_menu();
        assert_eq!(menu.len(), 3);
        for option in menu {
            assert!(matches!(
                Command::parse(&option.text),
                Some(Command::EnterCategory(_))
            ));
        }
    }
}
