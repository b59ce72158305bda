//! Shared fixtures for health-bot integration tests: a scripted LLM, a recording Bot and an
//! in-memory store harness wired the same way `build_bot_components` wires production.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use health_bot::extraction::ExtractionGateway;
use health_bot::{ConversationStateMachine, HealthPipeline, KnowledgeStore, WeeklyReporter};
use health_core::{Bot, Chat, MenuOption, Message, User};
use llm_client::LlmClient;
use prompt::ChatMessage;
use storage::{HealthLogRepository, LogStore, ProfileRepository, ProfileStore, SqlitePoolManager};
use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Routes tracing to the test writer; `RUST_LOG` controls the level.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,health_bot=debug"));
        let _ = fmt().with_env_filter(env_filter).with_test_writer().try_init();
    });
}

/// LLM stand-in: returns queued replies in order and records every request.
/// An empty queue, or a queued `Err`, fails the call like a transport error.
#[derive(Default)]
pub struct StubLlm {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl StubLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn push_failure(&self, reason: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Err(reason.into()));
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }

    /// System instruction of the most recent request.
    pub fn last_system_prompt(&self) -> String {
        self.requests
            .lock()
            .unwrap()
            .last()
            .and_then(|messages| messages.first())
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }

    fn next(&self, messages: Vec<ChatMessage>) -> anyhow::Result<String> {
        self.requests.lock().unwrap().push(messages);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(reason)) => Err(anyhow::anyhow!(reason)),
            None => Err(anyhow::anyhow!("no scripted reply left")),
        }
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn complete(&self, messages: Vec<ChatMessage>) -> anyhow::Result<String> {
        self.next(messages)
    }

    async fn complete_json(&self, messages: Vec<ChatMessage>) -> anyhow::Result<String> {
        self.next(messages)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Reply(String),
    Push(String),
    Menu { text: String, options: Vec<MenuOption> },
}

/// Bot stand-in recording everything sent, in order.
#[derive(Default)]
pub struct RecordingBot {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingBot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn pushes(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Push(text) => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, _chat: &Chat, text: &str) -> health_core::Result<()> {
        self.sent.lock().unwrap().push(Sent::Push(text.to_string()));
        Ok(())
    }

    async fn reply_to(&self, _message: &Message, text: &str) -> health_core::Result<()> {
        self.sent.lock().unwrap().push(Sent::Reply(text.to_string()));
        Ok(())
    }

    async fn send_menu(
        &self,
        _chat: &Chat,
        text: &str,
        options: &[MenuOption],
    ) -> health_core::Result<()> {
        self.sent.lock().unwrap().push(Sent::Menu {
            text: text.to_string(),
            options: options.to_vec(),
        });
        Ok(())
    }
}

/// The bundled reference documents.
pub fn bundled_knowledge_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("rag_reference")
}

/// In-memory stores plus the services built on them.
pub struct Harness {
    pub profiles: Arc<dyn ProfileStore>,
    pub logs: Arc<dyn LogStore>,
    pub llm: Arc<StubLlm>,
    pub state: Arc<ConversationStateMachine>,
    pub pipeline: Arc<HealthPipeline>,
    pub reporter: Arc<WeeklyReporter>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_knowledge(KnowledgeStore::new(bundled_knowledge_dir())).await
    }

    pub async fn with_knowledge(knowledge: KnowledgeStore) -> Self {
        init_tracing();
        let pool = SqlitePoolManager::new("sqlite::memory:").await.unwrap();
        let profiles: Arc<dyn ProfileStore> =
            Arc::new(ProfileRepository::with_pool(pool.clone()).await.unwrap());
        let logs: Arc<dyn LogStore> = Arc::new(HealthLogRepository::with_pool(pool).await.unwrap());
        let llm = Arc::new(StubLlm::new());
        let state = Arc::new(ConversationStateMachine::new(profiles.clone()));
        let pipeline = Arc::new(HealthPipeline::new(
            profiles.clone(),
            logs.clone(),
            knowledge,
            ExtractionGateway::new(llm.clone()),
            state.clone(),
        ));
        let reporter = Arc::new(WeeklyReporter::new(profiles.clone(), logs.clone(), llm.clone()));
        Self {
            profiles,
            logs,
            llm,
            state,
            pipeline,
            reporter,
        }
    }
}

pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn text_message(user_id: i64, content: &str) -> Message {
    Message {
        id: "1".to_string(),
        user: User {
            id: user_id,
            username: Some("tester".to_string()),
            first_name: Some("Test".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: user_id,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        message_type: "text".to_string(),
        created_at: chrono::Utc::now(),
    }
}
