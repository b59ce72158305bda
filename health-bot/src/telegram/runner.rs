//! REPL runner: converts teloxide messages to core messages and hands them to the HandlerChain.

use anyhow::Result;
use handler_chain::HandlerChain;
use health_core::ToCoreMessage;
use teloxide::prelude::*;
use tracing::{error, info, instrument};

use super::adapters::TelegramMessageWrapper;

/// Starts the long-polling REPL. Each text message runs the chain in its own task; per-user
/// ordering is enforced by the conversation lock, not by the REPL.
#[instrument(skip(bot, handler_chain))]
pub async fn run_repl(bot: teloxide::Bot, handler_chain: HandlerChain) -> Result<()> {
    if let Ok(me) = bot.get_me().await {
        info!(username = ?me.user.username, "Connected to Telegram");
    }

    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let chain = handler_chain.clone();

        async move {
            if msg.text().is_some() {
                let core_msg = TelegramMessageWrapper(&msg).to_core();
                tokio::spawn(async move {
                    info!(
                        user_id = core_msg.user.id,
                        chat_id = core_msg.chat.id,
                        message_id = %core_msg.id,
                        "step: processing message (handler chain started)"
                    );
                    if let Err(e) = chain.handle(&core_msg).await {
                        error!(error = %e, user_id = core_msg.user.id, "Handler chain failed");
                    }
                });
            } else {
                info!(chat_id = msg.chat.id.0, "Ignoring non-text message");
            }
            respond(())
        }
    })
    .await;

    Ok(())
}
