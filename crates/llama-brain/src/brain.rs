//! Primary engine: an OpenAI-compatible chat-completions API.

use std::time::Duration;

use brain_core::{async_trait, Brain, BrainError, Completion, GenerationRequest};
use reqwest::Client;
use tracing::debug;

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse};
use crate::config::LlamaBrainConfig;

/// A brain that sends ordered messages to a chat-completions endpoint and
/// returns the first candidate's message content.
pub struct ChatCompletionBrain {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionBrain {
    /// Create the engine. Fails when no API key is configured.
    pub fn new(config: &LlamaBrainConfig) -> Result<Self, BrainError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| BrainError::Configuration("LLM_API_KEY not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BrainError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }

    /// Model name sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Brain for ChatCompletionBrain {
    async fn generate(&self, request: GenerationRequest) -> Result<Completion, BrainError> {
        let url = format!("{}/v1/chat/completions", self.api_url);

        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: request.input.to_messages(),
            max_tokens: request.options.max_tokens,
            temperature: request.options.temperature,
        };

        debug!(
            model = %body.model,
            messages = body.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| BrainError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Prefer the structured API message when there is one
            let message = serde_json::from_str::<ApiError>(&error_text)
                .map(|api_error| api_error.error.message)
                .unwrap_or(error_text);

            return Err(BrainError::ProcessingFailed(format!(
                "API error ({}): {}",
                status.as_u16(),
                message
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| BrainError::ProcessingFailed(format!("Failed to parse response: {}", e)))?;

        if let Some(ref usage) = completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| Completion::from_value(choice.message.content))
            .ok_or_else(|| BrainError::ProcessingFailed("response had no choices".to_string()))
    }

    fn name(&self) -> &str {
        "ChatCompletionBrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let config = LlamaBrainConfig::default();
        let err = ChatCompletionBrain::new(&config).err().unwrap();
        assert!(matches!(err, BrainError::Configuration(msg) if msg.contains("LLM_API_KEY")));
    }

    #[test]
    fn test_brain_name_and_model() {
        let config = LlamaBrainConfig::builder()
            .api_key("test-key")
            .api_url("https://llm.test/")
            .model("llama-3.1-8b")
            .build();
        let brain = ChatCompletionBrain::new(&config).unwrap();
        assert_eq!(brain.name(), "ChatCompletionBrain");
        assert_eq!(brain.model(), "llama-3.1-8b");
        assert_eq!(brain.api_url, "https://llm.test");
    }
}
