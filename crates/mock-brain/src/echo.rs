//! A brain that repeats the user.

use async_trait::async_trait;
use brain_core::{Brain, BrainError, Completion, GenerationRequest};

/// Answers with the last user turn of the request, optionally prefixed.
///
/// Flat prompts count as a single user turn.
#[derive(Debug, Clone, Default)]
pub struct EchoBrain {
    prefix: Option<String>,
}

impl EchoBrain {
    /// Echo without a prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Echo with `prefix` in front, e.g. `"caption: "`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

#[async_trait]
impl Brain for EchoBrain {
    async fn generate(&self, request: GenerationRequest) -> Result<Completion, BrainError> {
        let last = request.input.last_user_text();
        let prefix = self.prefix.as_deref().unwrap_or_default();
        Ok(Completion::text(format!("{}{}", prefix, last)))
    }

    fn name(&self) -> &str {
        "EchoBrain"
    }
}
