//! Core trait and types for SevenAI model engines.
//!
//! This crate provides the shared interface used by every engine, tool and
//! the orchestrator. It defines:
//!
//! - [`Brain`] - The trait every text-generation engine implements
//! - [`Turn`] / [`Role`] - Ordered conversational messages
//! - [`GenerationRequest`] / [`Completion`] - The narrow engine contract
//! - [`BrainError`] - Error types for engine operations
//! - [`Deadline`] - A per-turn deadline threaded through downstream calls
//! - [`FactStore`] / [`ConversationStore`] - Read/write boundaries to persistence
//!
//! # Example
//!
//! ```rust
//! use brain_core::{async_trait, Brain, BrainError, Completion, GenerationRequest};
//!
//! struct MyBrain;
//!
//! #[async_trait]
//! impl Brain for MyBrain {
//!     async fn generate(&self, request: GenerationRequest) -> Result<Completion, BrainError> {
//!         Ok(Completion::text(format!("echo: {}", request.input.last_user_text())))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "MyBrain"
//!     }
//! }
//! ```

mod deadline;
mod error;
mod facts;
mod history;
mod message;
mod prompt;
mod trait_def;

pub use deadline::Deadline;
pub use error::{BrainError, StoreError};
pub use facts::{FactStore, InMemoryFactStore, UserFact};
pub use history::{Conversation, ConversationStore, InMemoryConversationStore, StoredMessage};
pub use message::{Role, Turn};
pub use prompt::hash_prompt;
pub use trait_def::{Brain, Completion, GenerationOptions, GenerationRequest, PromptInput};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
