//! Entry point used by the binary: validate config, init logging, build components, run the REPL.

use anyhow::Result;
use handler_chain::HandlerChain;
use health_core::init_tracing;
use tracing::{info, instrument};

use crate::components::{build_bot_components, build_handler_chain, BotComponents};
use crate::config::BotConfig;
use crate::telegram::run_repl;

#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(&config.log_file)?;

    info!(
        database_url = %config.database_url,
        knowledge_dir = %config.knowledge_dir.display(),
        model = %config.model,
        "Initializing bot"
    );

    let components = build_bot_components(&config, None).await?;
    let handler_chain = build_handler_chain(&components);

    info!("Bot started successfully");
    run_repl(components.teloxide_bot.clone(), handler_chain).await
}

/// Builds components and the chain without starting the REPL. Integration tests inject a
/// recording bot and drive the chain with core messages.
pub async fn build_only(
    config: &BotConfig,
    bot_override: std::sync::Arc<dyn health_core::Bot>,
) -> Result<(BotComponents, HandlerChain)> {
    config.validate()?;
    let components = build_bot_components(config, Some(bot_override)).await?;
    let handler_chain = build_handler_chain(&components);
    Ok((components, handler_chain))
}
