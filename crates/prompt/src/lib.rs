//! # Prompt
//!
//! Chat message types shared by the LLM client, and formatting of titled instruction sections
//! into one system prompt.
//!
//! ## Format
//!
//! Each non-empty section renders as `【{title}】` on its own line followed by the body, sections
//! separated by one blank line. Sections with an empty body are dropped.
//!
//! ## External interactions
//!
//! - **AI models**: Output is sent to OpenAI-compatible chat completion APIs.

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// One titled block of an instruction prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSection {
    pub title: String,
    pub body: String,
}

impl PromptSection {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Renders sections in order as `【title】\nbody`, separated by a blank line.
///
/// Bodies are trimmed; a section whose trimmed body is empty is skipped entirely.
pub fn format_sections<'a, I>(sections: I) -> String
where
    I: IntoIterator<Item = &'a PromptSection>,
{
    let mut out = String::new();
    for section in sections {
        let body = section.body.trim();
        if body.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push('【');
        out.push_str(section.title.trim());
        out.push_str("】\n");
        out.push_str(body);
    }
    out
}

/// Builds the two-message exchange used for single-shot extraction: system instruction, then the user's text.
pub fn instruction_messages(system_instruction: &str, user_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_instruction),
        ChatMessage::user(user_text),
    ]
}
