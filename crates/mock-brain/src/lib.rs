//! Mock brains and image tools for testing.
//!
//! This crate provides test doubles for every external collaborator of the
//! orchestrator:
//! - `EchoBrain` - Echoes the last user message back
//! - `ScriptedBrain` - Replays queued replies and records every request
//! - `FailingBrain` - Always fails with a configurable error
//! - `DelayedBrain` - Wraps another brain with artificial delay
//! - `MockImageGenerator` / `MockImageAnalyzer` - Canned image tool results
//!   with call counters
//!
//! For production engines, use the `llama-brain` and `image-tools` crates.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{Brain, EchoBrain, GenerationRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::BrainError> {
//!     let brain = EchoBrain::new();
//!
//!     let completion = brain.generate(GenerationRequest::new("Hello!")).await?;
//!     println!("Response: {:?}", completion.as_text());
//!     Ok(())
//! }
//! ```

// Mock implementations
mod delayed;
mod echo;
mod failing;
mod images;
mod scripted;

// Re-export brain-core types for convenience
pub use brain_core::{
    async_trait, Brain, BrainError, Completion, GenerationOptions, GenerationRequest, PromptInput,
};

// Export mock implementations
pub use delayed::DelayedBrain;
pub use echo::EchoBrain;
pub use failing::FailingBrain;
pub use images::{MockImageAnalyzer, MockImageGenerator};
pub use scripted::ScriptedBrain;
