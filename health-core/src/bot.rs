//! Bot abstraction for sending replies, pushes and option menus.
//!
//! [`Bot`] is transport-agnostic; health-bot implements it over teloxide, tests substitute a recording bot.

use crate::error::Result;
use crate::types::{Chat, Message};
use async_trait::async_trait;

/// One selectable entry of a reply menu. `text` is what the user sends back when tapping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    pub text: String,
}

impl MenuOption {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Abstraction for outbound messages. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends (pushes) a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;
    /// Sends a reply to the given message (same chat).
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()>;
    /// Sends a text with a quick-reply menu; each option sends its `text` back when chosen.
    async fn send_menu(&self, chat: &Chat, text: &str, options: &[MenuOption]) -> Result<()>;
}
