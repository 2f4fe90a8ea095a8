//! Secondary engine: a local Llama HTTP wrapper.

use std::time::Duration;

use brain_core::{async_trait, Brain, BrainError, Completion, GenerationRequest};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::api_types::LocalGenerateRequest;
use crate::config::LlamaBrainConfig;

/// Posts `{prompt, temperature, max_tokens}` to a local endpoint.
///
/// Message lists are flattened into a role-tagged transcript since the
/// endpoint only accepts a single prompt string.
pub struct LocalHttpBrain {
    client: Client,
    url: String,
    temperature: f32,
    max_tokens: u32,
}

impl LocalHttpBrain {
    /// Create the engine from configuration.
    pub fn new(config: &LlamaBrainConfig) -> Result<Self, BrainError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BrainError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.local_url.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Endpoint this engine posts to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Pick the useful part of a local engine payload.
///
/// A non-empty `text` field wins, then a non-empty `output` field; anything
/// else is returned whole.
pub fn normalize_payload(payload: Value) -> Completion {
    for field in ["text", "output"] {
        if let Some(value) = payload.get(field) {
            if is_truthy(value) {
                return Completion::from_value(value.clone());
            }
        }
    }
    Completion::from_value(payload)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[async_trait]
impl Brain for LocalHttpBrain {
    async fn generate(&self, request: GenerationRequest) -> Result<Completion, BrainError> {
        let prompt = request.input.to_prompt();
        let body = LocalGenerateRequest {
            prompt: &prompt,
            temperature: request.options.temperature.unwrap_or(self.temperature),
            max_tokens: request.options.max_tokens.unwrap_or(self.max_tokens),
        };

        debug!(url = %self.url, prompt_len = prompt.len(), "Calling local engine");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BrainError::Network(format!("Failed to reach local engine: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BrainError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| BrainError::ProcessingFailed(format!("Failed to parse response: {}", e)))?;

        Ok(normalize_payload(payload))
    }

    fn name(&self) -> &str {
        "LocalHttpBrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_prefers_text() {
        let payload = json!({"text": "hello", "output": "ignored"});
        assert_eq!(normalize_payload(payload), Completion::text("hello"));
    }

    #[test]
    fn test_normalize_falls_back_to_output() {
        assert_eq!(
            normalize_payload(json!({"text": "", "output": "from output"})),
            Completion::text("from output")
        );
        assert_eq!(
            normalize_payload(json!({"output": "only output"})),
            Completion::text("only output")
        );
    }

    #[test]
    fn test_normalize_returns_whole_payload() {
        let payload = json!({"tokens": [1, 2, 3]});
        assert_eq!(
            normalize_payload(payload.clone()),
            Completion::Structured(payload)
        );
        assert_eq!(
            normalize_payload(json!("bare string")),
            Completion::text("bare string")
        );
    }

    #[test]
    fn test_local_brain_uses_config_url() {
        let config = LlamaBrainConfig::builder()
            .local_url("http://127.0.0.1:1/generate")
            .build();
        let brain = LocalHttpBrain::new(&config).unwrap();
        assert_eq!(brain.url(), "http://127.0.0.1:1/generate");
        assert_eq!(brain.name(), "LocalHttpBrain");
    }
}
