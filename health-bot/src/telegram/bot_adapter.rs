//! Wraps teloxide::Bot and implements [`health_core::Bot`]. Tests substitute a recording Bot.

use async_trait::async_trait;
use health_core::{Bot as CoreBot, Chat, CoreError, MenuOption, Message, Result};
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ChatId, KeyboardButton, KeyboardMarkup};

pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

/// One button per row; tapping a button sends its option text back as a message.
pub fn menu_keyboard(options: &[MenuOption]) -> KeyboardMarkup {
    let rows = options
        .iter()
        .map(|option| vec![KeyboardButton::new(option.text.clone())]);
    KeyboardMarkup::new(rows)
        .resize_keyboard()
        .one_time_keyboard()
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(|e| CoreError::Bot(e.to_string()))?;
        Ok(())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.chat, text).await
    }

    async fn send_menu(&self, chat: &Chat, text: &str, options: &[MenuOption]) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .reply_markup(menu_keyboard(options))
            .await
            .map_err(|e| CoreError::Bot(e.to_string()))?;
        Ok(())
    }
}
