//! Bot configuration loaded from environment variables (after `dotenvy`).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::knowledge::KnowledgeStore;

pub const DEFAULT_LOG_FILE: &str = "logs/health-bot.log";
pub const DEFAULT_DATABASE_URL: &str = "health_assistant.db";
pub const DEFAULT_OPENAI_BASE_URL: &str = llm_client::DEFAULT_BASE_URL;
pub const DEFAULT_MODEL: &str = llm_client::DEFAULT_MODEL;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

pub struct BotConfig {
    pub bot_token: String,
    /// Telegram Bot API base URL override (`TELEGRAM_API_URL` or `TELOXIDE_API_URL`), e.g. a mock server.
    pub telegram_api_url: Option<String>,
    pub log_file: String,
    pub database_url: String,
    /// Directory holding `diet_ref.json`, `sleep_ref.json` and `chronic_ref.json`.
    pub knowledge_dir: PathBuf,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model: String,
    pub llm_timeout_secs: u64,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl BotConfig {
    /// Loads from the environment. `token` overrides `BOT_TOKEN`.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(t) => t,
            None => env::var("BOT_TOKEN").context("BOT_TOKEN not set")?,
        };
        let openai_api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        let knowledge_dir = env::var("KNOWLEDGE_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(KnowledgeStore::default_dir);
        let llm_timeout_secs = match env::var("LLM_TIMEOUT_SECS") {
            Ok(v) => v
                .trim()
                .parse()
                .with_context(|| format!("LLM_TIMEOUT_SECS is not a number: {}", v))?,
            Err(_) => DEFAULT_LLM_TIMEOUT_SECS,
        };

        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file: var_or("LOG_FILE", DEFAULT_LOG_FILE),
            database_url: var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            knowledge_dir,
            openai_api_key,
            openai_base_url: var_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            model: var_or("MODEL", DEFAULT_MODEL),
            llm_timeout_secs,
        })
    }

    /// Fails fast on values that would only break later at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            bail!("BOT_TOKEN is empty");
        }
        if self.openai_api_key.trim().is_empty() {
            bail!("OPENAI_API_KEY is empty");
        }
        let base = reqwest::Url::parse(&self.openai_base_url)
            .with_context(|| format!("OPENAI_BASE_URL is not a valid URL: {}", self.openai_base_url))?;
        if !matches!(base.scheme(), "http" | "https") {
            bail!("OPENAI_BASE_URL must be http(s): {}", self.openai_base_url);
        }
        if let Some(url) = &self.telegram_api_url {
            reqwest::Url::parse(url)
                .with_context(|| format!("TELEGRAM_API_URL is not a valid URL: {}", url))?;
        }
        if self.llm_timeout_secs == 0 {
            bail!("LLM_TIMEOUT_SECS must be positive");
        }
        Ok(())
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}
