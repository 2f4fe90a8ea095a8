//! Error types for engine and store operations.

use thiserror::Error;

/// Errors that can occur while a brain generates text.
#[derive(Debug, Error)]
pub enum BrainError {
    /// The engine is not configured or cannot be constructed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request never reached the engine.
    #[error("network error: {0}")]
    Network(String),

    /// The engine answered with a non-success HTTP status.
    #[error("LLAMA HTTP error {status}: {body}")]
    Http {
        /// Status code returned by the engine.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The engine answered but the answer could not be used.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// The engine is temporarily unavailable.
    #[error("brain unavailable: {0}")]
    Unavailable(String),

    /// The turn deadline elapsed before the engine answered.
    #[error("processing timed out")]
    Timeout,
}

/// Errors raised by fact and conversation stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The conversation does not exist or belongs to someone else.
    #[error("conversation {0} not found")]
    ConversationNotFound(u64),

    /// The backing store failed.
    #[error("store backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message_embeds_status_and_body() {
        let err = BrainError::Http {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "LLAMA HTTP error 500: boom");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::ConversationNotFound(42);
        assert_eq!(err.to_string(), "conversation 42 not found");
    }
}
