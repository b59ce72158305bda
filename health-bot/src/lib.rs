//! # Health assistant bot
//!
//! Telegram front end for a health-logging assistant. Free text is classified into 飲食 / 睡眠 /
//! 慢性病, grounded with reference knowledge and same-day totals, turned into structured JSON by
//! the model and appended to the health log. Numeric rules (totals, BMI, DASH tiers, metabolic
//! alert) are computed here, not by the model.
//!
//! Wiring: [`components`] builds stores, LLM client and pipeline; [`runner::run_bot`] starts the REPL.

pub mod advice;
pub mod aggregate;
pub mod category;
pub mod chronic;
pub mod cli;
pub mod commands;
pub mod components;
pub mod config;
pub mod contract;
pub mod extraction;
pub mod handlers;
pub mod knowledge;
pub mod payload;
pub mod pipeline;
pub mod profile;
pub mod report;
pub mod runner;
pub mod state;
pub mod telegram;

pub use category::Category;
pub use cli::{load_config, Cli, Commands};
pub use components::{build_bot_components, build_handler_chain, BotComponents};
pub use config::BotConfig;
pub use knowledge::KnowledgeStore;
pub use pipeline::{HealthPipeline, TurnOutcome};
pub use report::WeeklyReporter;
pub use runner::{build_only, run_bot};
pub use state::ConversationStateMachine;
