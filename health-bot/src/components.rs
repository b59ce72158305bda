//! Component factory: builds BotComponents from config. Keeps assembly out of the runner.

use std::sync::Arc;

use anyhow::{Context, Result};
use handler_chain::HandlerChain;
use llm_client::{LlmClient, OpenAILlmClient};
use storage::{HealthLogRepository, LogStore, ProfileRepository, ProfileStore, SqlitePoolManager};
use tracing::{error, info, instrument};

use crate::config::BotConfig;
use crate::extraction::ExtractionGateway;
use crate::handlers::{HealthAssistantHandler, LoggingHandler};
use crate::knowledge::KnowledgeStore;
use crate::pipeline::HealthPipeline;
use crate::report::WeeklyReporter;
use crate::state::ConversationStateMachine;
use crate::telegram::TelegramBotAdapter;

/// Everything run_bot needs; produced by [`build_bot_components`].
#[derive(Clone)]
pub struct BotComponents {
    pub teloxide_bot: teloxide::Bot,
    /// Outbound transport used by handlers. The Telegram adapter unless overridden (tests).
    pub bot: Arc<dyn health_core::Bot>,
    pub profiles: Arc<dyn ProfileStore>,
    pub logs: Arc<dyn LogStore>,
    pub llm: Arc<dyn LlmClient>,
    pub knowledge: KnowledgeStore,
    pub state: Arc<ConversationStateMachine>,
    pub pipeline: Arc<HealthPipeline>,
    pub reporter: Arc<WeeklyReporter>,
}

fn teloxide_bot(config: &BotConfig) -> teloxide::Bot {
    let bot = teloxide::Bot::new(config.bot_token.clone());
    match config.telegram_api_url.as_deref() {
        Some(url_str) => match reqwest::Url::parse(url_str) {
            Ok(url) => bot.set_api_url(url),
            Err(e) => {
                error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                bot
            }
        },
        None => bot,
    }
}

/// Builds all components from config. `bot_override` replaces the Telegram adapter for handlers.
#[instrument(skip(config, bot_override))]
pub async fn build_bot_components(
    config: &BotConfig,
    bot_override: Option<Arc<dyn health_core::Bot>>,
) -> Result<BotComponents> {
    let pool = SqlitePoolManager::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    let profiles: Arc<dyn ProfileStore> = Arc::new(
        ProfileRepository::with_pool(pool.clone())
            .await
            .context("Failed to initialize profile storage")?,
    );
    let logs: Arc<dyn LogStore> = Arc::new(
        HealthLogRepository::with_pool(pool)
            .await
            .context("Failed to initialize health log storage")?,
    );
    info!(database_url = %config.database_url, "Storage ready");

    let llm: Arc<dyn LlmClient> = Arc::new(
        OpenAILlmClient::with_base_url(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.llm_timeout(),
        )?
        .with_model(config.model.clone()),
    );
    info!(model = %config.model, base_url = %config.openai_base_url, "LLM client ready");

    let knowledge = KnowledgeStore::new(config.knowledge_dir.clone());
    if !config.knowledge_dir.is_dir() {
        error!(dir = %config.knowledge_dir.display(), "Knowledge directory missing, turns will run without guidance");
    }

    let teloxide_bot = teloxide_bot(config);
    let bot: Arc<dyn health_core::Bot> = match bot_override {
        Some(bot) => bot,
        None => Arc::new(TelegramBotAdapter::new(teloxide_bot.clone())),
    };

    let state = Arc::new(ConversationStateMachine::new(profiles.clone()));
    let pipeline = Arc::new(HealthPipeline::new(
        profiles.clone(),
        logs.clone(),
        knowledge.clone(),
        ExtractionGateway::new(llm.clone()),
        state.clone(),
    ));
    let reporter = Arc::new(WeeklyReporter::new(
        profiles.clone(),
        logs.clone(),
        llm.clone(),
    ));

    Ok(BotComponents {
        teloxide_bot,
        bot,
        profiles,
        logs,
        llm,
        knowledge,
        state,
        pipeline,
        reporter,
    })
}

/// Builds the handler chain (logging → health assistant).
pub fn build_handler_chain(components: &BotComponents) -> HandlerChain {
    let assistant = HealthAssistantHandler::new(
        components.bot.clone(),
        components.state.clone(),
        components.pipeline.clone(),
        components.reporter.clone(),
    );
    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(assistant))
}
