//! Health categories and the keyword classifier.
//!
//! Labels are the user-facing (and persisted) Traditional Chinese names. Classification is pure:
//! a pending category always wins, otherwise keyword sets are scanned in the fixed order
//! diet → sleep → chronic and the first hit decides.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Diet,
    Sleep,
    Chronic,
    Unknown,
}

const DIET_KEYWORDS: &[&str] = &["飲食", "吃", "餐", "喝"];
const SLEEP_KEYWORDS: &[&str] = &["睡眠", "睡"];
const CHRONIC_KEYWORDS: &[&str] = &["血壓", "血糖", "慢性病"];

const DIET_RETRIEVAL_HINTS: &[&str] = &["熱量", "飯", "麵"];
const SLEEP_RETRIEVAL_HINTS: &[&str] = &["醒", "品質", "累", "夢"];
const CHRONIC_RETRIEVAL_HINTS: &[&str] = &["測量", "指數"];

impl Category {
    /// Categories that can be logged, in classification priority order.
    pub const RECORDABLE: [Category; 3] = [Category::Diet, Category::Sleep, Category::Chronic];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Diet => "飲食",
            Category::Sleep => "睡眠",
            Category::Chronic => "慢性病",
            Category::Unknown => "未知",
        }
    }

    /// Parses a persisted or command label. Unrecognized labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "飲食" => Some(Category::Diet),
            "睡眠" => Some(Category::Sleep),
            "慢性病" => Some(Category::Chronic),
            "未知" => Some(Category::Unknown),
            _ => None,
        }
    }

    pub fn is_recordable(&self) -> bool {
        !matches!(self, Category::Unknown)
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Diet => DIET_KEYWORDS,
            Category::Sleep => SLEEP_KEYWORDS,
            Category::Chronic => CHRONIC_KEYWORDS,
            Category::Unknown => &[],
        }
    }

    fn retrieval_hints(&self) -> &'static [&'static str] {
        match self {
            Category::Diet => DIET_RETRIEVAL_HINTS,
            Category::Sleep => SLEEP_RETRIEVAL_HINTS,
            Category::Chronic => CHRONIC_RETRIEVAL_HINTS,
            Category::Unknown => &[],
        }
    }

    /// True when `text` contains one of the classifier keywords of this category.
    pub fn matches(&self, text: &str) -> bool {
        self.keywords().iter().any(|k| text.contains(k))
    }

    /// Wider match used by knowledge retrieval: classifier keywords plus retrieval hints.
    pub fn matches_for_retrieval(&self, text: &str) -> bool {
        self.matches(text) || self.retrieval_hints().iter().any(|k| text.contains(k))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolves the category of one turn. `pending` (the user's selected logging mode) overrides
/// keyword classification unconditionally.
pub fn classify(text: &str, pending: Option<Category>) -> Category {
    if let Some(category) = pending {
        return category;
    }
    Category::RECORDABLE
        .into_iter()
        .find(|c| c.matches(text))
        .unwrap_or(Category::Unknown)
}
