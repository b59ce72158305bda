//! Telegram transport: adapters to core types, the [`health_core::Bot`] implementation and the REPL runner.

mod adapters;
mod bot_adapter;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::{menu_keyboard, TelegramBotAdapter};
pub use runner::run_repl;
