//! Turn orchestrator for the SevenAI assistant.
//!
//! This crate provides the [`Orchestrator`] type, which takes a user turn,
//! classifies its intent and dispatches it to image generation, image
//! analysis or the plain-chat path.
//!
//! # Architecture
//!
//! ```text
//! User turn {text?, imageBase64?, imageUrl?, userId?}
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  1. Classify intent (keywords, has-image)                   │
//! │         ↓                                                   │
//! │  2. Route:                                                  │
//! │     • generate_image → image generator → caption via model  │
//! │     • analyze_image  → image analyzer  → answer via model   │
//! │     • text           → prompt assembler or deep thinking    │
//! │         ↓                                                   │
//! │  3. Apply the failure policy of the call site               │
//! │         ↓                                                   │
//! │  4. Store the exchange in the conversation                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Image tool failures are reported to the caller, plain-chat failures are
//! masked with a fixed apology, and missing credentials abort the turn. See
//! [`CallSite`].
//!
//! # Example
//!
//! ```rust,ignore
//! use orchestrator::{Orchestrator, SendMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = Orchestrator::from_env()?;
//!
//!     let reply = orchestrator
//!         .send_message(SendMessage::new("user-1", "من أنت؟"))
//!         .await?;
//!
//!     println!("[{}] {}", reply.intent, reply.response);
//!     Ok(())
//! }
//! ```

mod chat;
mod config;
mod error;
mod intent;
mod orchestrator;
mod persona;
mod policy;
mod prompt;
mod router;
mod thinking;
mod title;

// Public exports
pub use chat::{ChatEngine, ChatReply, TECHNICAL_APOLOGY, THINKING_PREFIX};
pub use config::{
    OrchestratorConfig, DEFAULT_EXEMPLAR_LIMIT, DEFAULT_HISTORY_WINDOW, DEFAULT_PERSONA_FILE,
    DEFAULT_TURN_TIMEOUT_SECS,
};
pub use error::OrchestratorError;
pub use intent::{Intent, IntentClassifier, KeywordClassifier, ANALYSIS_KEYWORDS, GENERATION_KEYWORDS};
pub use orchestrator::{
    Orchestrator, OrchestratorBuilder, SendMessage, SendMessageReply, TurnDebug, TurnInput,
    TurnOutcome,
};
pub use persona::{Exemplar, Persona, DEFAULT_IDENTITY_PATTERN};
pub use policy::{CallSite, Disposition, FailurePolicy};
pub use prompt::{history_pairs, PromptAssembler};
pub use router::{analysis_prompt, caption_prompt, RouteOutcome, Router};
pub use thinking::{compose_prompt, reflect_prompt, DeepThinker, Thought, COMPOSE_FALLBACK, REFLECT_PLACEHOLDER};
pub use title::{TitleGenerator, DEFAULT_TITLE, MAX_TITLE_CHARS};

// Re-export commonly used types from dependencies
pub use brain_core::{Conversation, Deadline, FactStore, StoredMessage, Turn, UserFact};
pub use image_tools::{ImageAnalyzer, ImageGenerator, ImageSource, ToolResult};
pub use llama_brain::{ModelInvoker, ModelReply};
