//! Conversation titles.

use brain_core::{Deadline, GenerationOptions, Turn};
use llama_brain::{ModelInvoker, ModelReply};

use crate::error::OrchestratorError;
use crate::policy::CallSite;

/// Title used whenever the model gives nothing usable.
pub const DEFAULT_TITLE: &str = "محادثة جديدة";

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 50;

const TITLE_INSTRUCTION: &str = "ولّد عنواناً قصيراً (3-5 كلمات) للمحادثة. الرد يجب أن يكون العنوان فقط.";

/// Summarises a first message into a short title.
#[derive(Debug, Clone)]
pub struct TitleGenerator {
    invoker: ModelInvoker,
}

impl TitleGenerator {
    /// Create a generator over `invoker`.
    pub fn new(invoker: ModelInvoker) -> Self {
        Self { invoker }
    }

    /// A 3-5 word title for a conversation starting with `first_message`.
    ///
    /// Model failures fall back to [`DEFAULT_TITLE`].
    pub async fn summarize(
        &self,
        first_message: &str,
        deadline: Deadline,
    ) -> Result<String, OrchestratorError> {
        let messages = vec![
            Turn::system(TITLE_INSTRUCTION),
            Turn::user(format!("عنوان لـ: \"{}\"", first_message)),
        ];

        match self
            .invoker
            .invoke_until(messages, GenerationOptions::default(), deadline)
            .await
        {
            ModelReply::Text(text) => {
                let title: String = text.trim().chars().take(MAX_TITLE_CHARS).collect();
                if title.is_empty() {
                    Ok(DEFAULT_TITLE.to_string())
                } else {
                    Ok(title)
                }
            }
            ModelReply::Failed(error) => CallSite::TitleGeneration
                .handle(&error)
                .or_mask(|| DEFAULT_TITLE.to_string()),
            ModelReply::Structured(_) => Ok(DEFAULT_TITLE.to_string()),
        }
    }
}
