//! The Brain trait definition and its request/response contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BrainError;
use crate::message::{Role, Turn};

/// What a brain is asked to continue: a bare prompt or an ordered message list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptInput {
    /// A single free-form prompt.
    Prompt(String),
    /// An ordered message list (system first, query last).
    Messages(Vec<Turn>),
}

impl PromptInput {
    /// View the input as a message list.
    ///
    /// A bare prompt becomes a single user turn.
    pub fn to_messages(&self) -> Vec<Turn> {
        match self {
            PromptInput::Prompt(prompt) => vec![Turn::user(prompt.clone())],
            PromptInput::Messages(turns) => turns.clone(),
        }
    }

    /// View the input as a single prompt string.
    ///
    /// Message lists are flattened into a `role: content` transcript, one
    /// block per turn, in order.
    pub fn to_prompt(&self) -> String {
        match self {
            PromptInput::Prompt(prompt) => prompt.clone(),
            PromptInput::Messages(turns) => turns
                .iter()
                .map(|turn| format!("{}: {}", turn.role.as_str(), turn.content))
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }

    /// The text of the last user turn (or the prompt itself).
    pub fn last_user_text(&self) -> &str {
        match self {
            PromptInput::Prompt(prompt) => prompt,
            PromptInput::Messages(turns) => turns
                .iter()
                .rev()
                .find(|turn| turn.role == Role::User)
                .map(|turn| turn.content.as_str())
                .unwrap_or(""),
        }
    }
}

impl From<String> for PromptInput {
    fn from(prompt: String) -> Self {
        PromptInput::Prompt(prompt)
    }
}

impl From<&str> for PromptInput {
    fn from(prompt: &str) -> Self {
        PromptInput::Prompt(prompt.to_string())
    }
}

impl From<Vec<Turn>> for PromptInput {
    fn from(turns: Vec<Turn>) -> Self {
        PromptInput::Messages(turns)
    }
}

/// Sampling options. Unset fields fall back to each engine's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation.
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
}

impl GenerationOptions {
    /// Set the temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Fill unset fields from `defaults`.
    pub fn or(self, defaults: GenerationOptions) -> Self {
        Self {
            temperature: self.temperature.or(defaults.temperature),
            max_tokens: self.max_tokens.or(defaults.max_tokens),
        }
    }
}

/// A single generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// The prompt or messages to continue.
    pub input: PromptInput,
    /// Sampling options.
    pub options: GenerationOptions,
}

impl GenerationRequest {
    /// Create a request with default options.
    pub fn new(input: impl Into<PromptInput>) -> Self {
        Self {
            input: input.into(),
            options: GenerationOptions::default(),
        }
    }

    /// Attach sampling options.
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// What a brain produced.
///
/// Engines do not always answer with plain text; a payload without a
/// recognisable text field is kept as structured JSON so callers can decide
/// how to treat it.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Plain generated text.
    Text(String),
    /// A payload that is not text-shaped.
    Structured(Value),
}

impl Completion {
    /// Create a text completion.
    pub fn text(text: impl Into<String>) -> Self {
        Completion::Text(text.into())
    }

    /// Classify an arbitrary JSON value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Completion::Text(text),
            other => Completion::Structured(other),
        }
    }

    /// The text, if this completion is text-shaped.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Completion::Text(text) => Some(text),
            Completion::Structured(_) => None,
        }
    }
}

/// A text-generation engine.
///
/// Implementations range from remote chat-completion APIs to local HTTP
/// wrappers and test doubles. This trait is object-safe and is normally
/// held as `Arc<dyn Brain>`.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Generate a completion for the request.
    async fn generate(&self, request: GenerationRequest) -> Result<Completion, BrainError>;

    /// Get a human-readable name for this engine.
    fn name(&self) -> &str;

    /// Check if the engine is ready to accept requests.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prompt_to_messages_is_single_user_turn() {
        let input = PromptInput::from("hello");
        assert_eq!(input.to_messages(), vec![Turn::user("hello")]);
    }

    #[test]
    fn test_messages_to_prompt_transcript() {
        let input = PromptInput::from(vec![
            Turn::system("be nice"),
            Turn::user("hi"),
            Turn::assistant("hello"),
            Turn::user("bye"),
        ]);
        assert_eq!(
            input.to_prompt(),
            "system: be nice\n\nuser: hi\n\nassistant: hello\n\nuser: bye"
        );
        assert_eq!(input.last_user_text(), "bye");
    }

    #[test]
    fn test_options_fallback() {
        let defaults = GenerationOptions::default().temperature(0.2).max_tokens(512);
        let merged = GenerationOptions::default().max_tokens(64).or(defaults);
        assert_eq!(merged.temperature, Some(0.2));
        assert_eq!(merged.max_tokens, Some(64));
    }

    #[test]
    fn test_completion_from_value() {
        assert_eq!(Completion::from_value(json!("text")), Completion::text("text"));
        let structured = Completion::from_value(json!({"a": 1}));
        assert!(structured.as_text().is_none());
    }
}
