//! Logs each inbound message in before() and the outcome in after(); never stops the chain.

use async_trait::async_trait;
use health_core::{Handler, HandlerResponse, Message, Result};
use tracing::{debug, info, instrument};

pub struct LoggingHandler;

fn outcome_kind(response: &HandlerResponse) -> &'static str {
    match response {
        HandlerResponse::Continue => "continue",
        HandlerResponse::Stop => "stop",
        HandlerResponse::Ignore => "ignore",
        HandlerResponse::Reply(_) => "reply",
    }
}

#[async_trait]
impl Handler for LoggingHandler {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &Message) -> Result<bool> {
        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            username = %message.user.username.as_deref().unwrap_or("unknown"),
            content_chars = message.content.chars().count(),
            "Received message"
        );
        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        let reply_chars = match response {
            HandlerResponse::Reply(text) => text.chars().count(),
            _ => 0,
        };
        debug!(
            message_id = %message.id,
            outcome = outcome_kind(response),
            reply_chars,
            "Processed message"
        );
        Ok(())
    }
}
