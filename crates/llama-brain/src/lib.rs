//! Model invocation with a primary engine and a local HTTP fallback.
//!
//! This crate provides the [`ModelInvoker`], the single entry point the
//! orchestrator uses to turn a prompt (or an ordered message list) into text.
//!
//! # Engines
//!
//! - [`ChatCompletionBrain`] - OpenAI-compatible chat completions API
//!   (primary, accepts ordered messages)
//! - [`LocalHttpBrain`] - a local Llama HTTP wrapper accepting
//!   `{prompt, temperature, max_tokens}` (secondary, always available)
//!
//! # Fallback policy
//!
//! The [`EngineStrategy`] is chosen once from configuration. Under
//! [`EngineStrategy::PrimaryWithFallback`] any primary failure is logged and
//! swallowed and the secondary engine is tried. Only a secondary failure
//! becomes visible, as [`ModelReply::Failed`] carrying a tagged error string.
//! The invoker never returns an `Err`.
//!
//! # Example
//!
//! ```rust,no_run
//! use llama_brain::{GenerationOptions, ModelInvoker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let invoker = ModelInvoker::from_env()?;
//!     let reply = invoker
//!         .invoke("Say hello in Arabic.", GenerationOptions::default())
//!         .await;
//!     println!("{}", reply.into_display());
//!     Ok(())
//! }
//! ```

mod api_types;
mod brain;
mod config;
mod invoker;
mod local;

pub use brain::ChatCompletionBrain;
pub use config::{EngineStrategy, LlamaBrainConfig, LlamaBrainConfigBuilder};
pub use invoker::{ModelInvoker, ModelReply, ENGINE_ERROR_PREFIX};
pub use local::{normalize_payload, LocalHttpBrain};

// Re-export brain-core types for convenience
pub use brain_core::{
    async_trait, Brain, BrainError, Completion, Deadline, GenerationOptions, GenerationRequest,
    PromptInput, Turn,
};
