//! Health assistant handler: answers fixed commands directly and hands free text to the pipeline.
//!
//! **External interactions:** Bot trait (replies, menu, report push), ConversationStateMachine
//! (category selection), HealthPipeline (extraction turn), WeeklyReporter (async report).

use std::sync::Arc;

use async_trait::async_trait;
use health_core::{Bot, Handler, HandlerResponse, Message, Result};
use tracing::{error, info, instrument};

use crate::commands::{category_prompt, record_menu, Command, PROFILE_GUIDE, RECORD_MENU_PROMPT};
use crate::pipeline::{HealthPipeline, SYSTEM_BUSY_REPLY};
use crate::report::{WeeklyReporter, REPORT_ACK};
use crate::state::ConversationStateMachine;

#[derive(Clone)]
pub struct HealthAssistantHandler {
    bot: Arc<dyn Bot>,
    state: Arc<ConversationStateMachine>,
    pipeline: Arc<HealthPipeline>,
    reporter: Arc<WeeklyReporter>,
}

impl HealthAssistantHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        state: Arc<ConversationStateMachine>,
        pipeline: Arc<HealthPipeline>,
        reporter: Arc<WeeklyReporter>,
    ) -> Self {
        Self {
            bot,
            state,
            pipeline,
            reporter,
        }
    }

    async fn reply(&self, message: &Message, text: &str) -> Result<HandlerResponse> {
        self.bot.reply_to(message, text).await?;
        Ok(HandlerResponse::Reply(text.to_string()))
    }

    async fn run_command(&self, message: &Message, command: Command) -> Result<HandlerResponse> {
        let user_id = message.user.key();
        match command {
            Command::UpdateProfile => self.reply(message, PROFILE_GUIDE).await,
            Command::StartRecording => {
                self.bot
                    .send_menu(&message.chat, RECORD_MENU_PROMPT, &record_menu())
                    .await?;
                Ok(HandlerResponse::Reply(RECORD_MENU_PROMPT.to_string()))
            }
            Command::EnterCategory(category) => {
                let _turn = self.state.lock(&user_id).await;
                match self.state.select(&user_id, category).await {
                    Ok(()) => self.reply(message, category_prompt(category)).await,
                    Err(e) => {
                        error!(user_id = %user_id, error = %e, "Failed to store pending category");
                        self.reply(message, SYSTEM_BUSY_REPLY).await
                    }
                }
            }
            Command::WeeklyReport => {
                let response = self.reply(message, REPORT_ACK).await?;
                let bot = self.bot.clone();
                let reporter = self.reporter.clone();
                let chat = message.chat.clone();
                tokio::spawn(async move {
                    let report = reporter.generate(&user_id).await;
                    if let Err(e) = bot.send_message(&chat, &report).await {
                        error!(user_id = %user_id, error = %e, "Failed to push weekly report");
                    }
                });
                Ok(response)
            }
        }
    }
}

#[async_trait]
impl Handler for HealthAssistantHandler {
    #[instrument(skip(self, message), fields(user_id = message.user.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if message.content.trim().is_empty() {
            return Ok(HandlerResponse::Ignore);
        }

        if let Some(command) = Command::parse(&message.content) {
            info!(command = ?command, "step: fixed command");
            return self.run_command(message, command).await;
        }

        let outcome = self
            .pipeline
            .process(&message.user.key(), &message.content)
            .await;
        info!(outcome = outcome.kind(), "step: turn finished");
        self.reply(message, outcome.reply()).await
    }
}
