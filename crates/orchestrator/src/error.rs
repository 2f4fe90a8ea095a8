//! Error types for orchestrator operations.

use brain_core::{BrainError, StoreError};
use thiserror::Error;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A required credential or setting is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An image tool failed; the message is safe to show to the user.
    #[error("{0}")]
    ToolFailed(String),

    /// The request itself is unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Conversation persistence failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An engine could not be constructed.
    #[error("brain error: {0}")]
    Brain(#[from] BrainError),
}

impl OrchestratorError {
    /// Whether the error means the conversation does not exist for this user.
    pub fn is_not_found(&self) -> bool {
        matches!(self, OrchestratorError::Store(StoreError::ConversationNotFound(_)))
    }
}
