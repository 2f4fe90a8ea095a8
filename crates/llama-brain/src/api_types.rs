//! Wire types for the chat-completions API and the local generate endpoint.

use brain_core::Turn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model to use
    pub model: String,
    /// Ordered messages, system first
    pub messages: Vec<Turn>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Chat completion response. Only the fields the invoker reads are modelled.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Candidate list; the first entry carries the answer
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token usage
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// A response candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The message
    pub message: ResponseMessage,
}

/// Candidate message. Content is not guaranteed to be a string.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Content (string, content-part array, or null)
    #[serde(default)]
    pub content: Value,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Completion tokens
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

/// API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Error details
    pub error: ApiErrorDetails,
}

/// API error details.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetails {
    /// Error message
    pub message: String,
}

/// Body posted to the local generate endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LocalGenerateRequest<'a> {
    /// Flattened prompt
    pub prompt: &'a str,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_turns() {
        let request = ChatCompletionRequest {
            model: "m".to_string(),
            messages: vec![Turn::system("s"), Turn::user("u")],
            max_tokens: None,
            temperature: Some(0.5),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "u");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let json = r#"{"choices":[{"message":{"role":"assistant"}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert!(response.choices[0].message.content.is_null());
        assert!(response.usage.is_none());
    }
}
