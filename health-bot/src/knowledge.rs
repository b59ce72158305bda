//! Reference knowledge store: one static JSON guideline document per category.
//!
//! Documents are read on every retrieval and embedded verbatim in the extraction prompt. A missing
//! or unreadable document never fails a turn; it degrades to empty knowledge.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::category::Category;

pub const KNOWLEDGE_DIR_NAME: &str = "rag_reference";
const KNOWLEDGE_PREFIX: &str = "參考之醫學指南標準：";

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("no reference document for category {0}")]
    NoDocument(Category),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome of one retrieval.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    Found { category: Category, document: Value },
    /// Unknown category and no retrieval keyword in the text.
    NoMatch,
    /// A document was selected but could not be loaded.
    Unavailable { category: Category, reason: String },
}

impl Retrieval {
    pub fn document(&self) -> Option<&Value> {
        match self {
            Retrieval::Found { document, .. } => Some(document),
            _ => None,
        }
    }

    /// Knowledge string for the prompt; empty unless a document was found.
    pub fn render(&self) -> String {
        match self {
            Retrieval::Found { document, .. } => format!("{}{}", KNOWLEDGE_PREFIX, document),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    dir: PathBuf,
}

impl KnowledgeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `rag_reference/` next to the running executable; falls back to the crate's own copy when
    /// the executable directory has none (e.g. `cargo run`).
    pub fn default_dir() -> PathBuf {
        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(KNOWLEDGE_DIR_NAME)));
        match beside_exe {
            Some(dir) if dir.is_dir() => dir,
            _ => Path::new(env!("CARGO_MANIFEST_DIR")).join(KNOWLEDGE_DIR_NAME),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(category: Category) -> Option<&'static str> {
        match category {
            Category::Diet => Some("diet_ref.json"),
            Category::Sleep => Some("sleep_ref.json"),
            Category::Chronic => Some("chronic_ref.json"),
            Category::Unknown => None,
        }
    }

    pub async fn load(&self, category: Category) -> Result<Value, KnowledgeError> {
        let file_name = Self::file_name(category).ok_or(KnowledgeError::NoDocument(category))?;
        let path = self.dir.join(file_name);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| KnowledgeError::Io {
                path: path.clone(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| KnowledgeError::Parse { path, source })
    }

    /// Known categories map directly to their document; `Unknown` falls back to a keyword scan of
    /// `text` in priority order.
    pub async fn retrieve(&self, category: Category, text: &str) -> Retrieval {
        let selected = if category.is_recordable() {
            Some(category)
        } else {
            Category::RECORDABLE
                .into_iter()
                .find(|c| c.matches_for_retrieval(text))
        };

        let Some(selected) = selected else {
            info!(category = %category, "Knowledge: no document matched");
            return Retrieval::NoMatch;
        };

        match self.load(selected).await {
            Ok(document) => {
                info!(category = %selected, "Knowledge: document loaded");
                Retrieval::Found {
                    category: selected,
                    document,
                }
            }
            Err(e) => {
                warn!(category = %selected, error = %e, "Knowledge: document unavailable");
                Retrieval::Unavailable {
                    category: selected,
                    reason: e.to_string(),
                }
            }
        }
    }
}
