//! Error type for the assistant core.

use thiserror::Error;

/// Failure surfaced through the [`Bot`](crate::Bot) and [`Handler`](crate::Handler) traits.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The messaging transport rejected or failed a send.
    #[error("Bot error: {0}")]
    Bot(String),
}

/// Result type for core operations; uses [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
