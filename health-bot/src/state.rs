//! Per-user conversation state: idle or waiting for free text of a selected category.
//!
//! The pending category is persisted on the profile row so it survives restarts. A per-user async
//! lock serializes whole turns (read state → extract → insert → clear) for the same user.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use storage::{ProfileStore, StorageError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::category::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    Pending(Category),
}

impl ConversationState {
    pub fn pending(&self) -> Option<Category> {
        match self {
            ConversationState::Idle => None,
            ConversationState::Pending(c) => Some(*c),
        }
    }
}

/// Held for the duration of one user's turn.
pub type TurnGuard = OwnedMutexGuard<()>;

pub struct ConversationStateMachine {
    store: Arc<dyn ProfileStore>,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ConversationStateMachine {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Waits for the user's turn lock. Locks nobody holds or waits on are pruned on the way.
    pub async fn lock(&self, user_id: &str) -> TurnGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.retain(|key, l| key == user_id || Arc::strong_count(l) > 1);
            locks
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    pub async fn current(&self, user_id: &str) -> Result<ConversationState, StorageError> {
        let label = self.store.pending_category(user_id).await?;
        Ok(match label.as_deref().map(|l| (l, Category::from_label(l))) {
            None => ConversationState::Idle,
            Some((_, Some(c))) if c.is_recordable() => ConversationState::Pending(c),
            Some((label, _)) => {
                warn!(user_id = %user_id, label = %label, "Ignoring unrecognized pending category");
                ConversationState::Idle
            }
        })
    }

    /// Enters `category` mode, overwriting any previous pending category. `Unknown` clears it.
    pub async fn select(&self, user_id: &str, category: Category) -> Result<(), StorageError> {
        if !category.is_recordable() {
            return self.complete(user_id).await;
        }
        self.store
            .set_pending_category(user_id, Some(category.label()))
            .await?;
        info!(user_id = %user_id, category = %category, "Pending category selected");
        Ok(())
    }

    /// Back to idle; called only after the turn's record insert is confirmed.
    pub async fn complete(&self, user_id: &str) -> Result<(), StorageError> {
        self.store.set_pending_category(user_id, None).await?;
        info!(user_id = %user_id, "Pending category cleared");
        Ok(())
    }
}
