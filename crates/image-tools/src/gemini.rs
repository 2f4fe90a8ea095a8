//! Image analysis through a Gemini-compatible HTTP API.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{ImageAnalysis, ImageAnalyzer, ImageSource};

/// Instruction sent with every image.
pub const ANALYSIS_INSTRUCTION: &str = "Analyze the provided image and return a concise description, detected objects, any text (OCR) and relevant attributes.";

/// Length cap applied to the raw payload when no candidates are present.
const RAW_FALLBACK_CHARS: usize = 2000;

/// Configuration for [`GeminiVision`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key. Calls fail with a configuration error without it.
    pub api_key: Option<String>,
    /// Endpoint override. When unset the key is appended to the default endpoint.
    pub api_url: Option<String>,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            timeout_secs: 60,
        }
    }
}

impl GeminiConfig {
    /// Read `GEMINI_API_KEY` and `GEMINI_API_URL`. Never fails.
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            api_url: env::var("GEMINI_API_URL").ok().filter(|u| !u.is_empty()),
            ..Self::default()
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    fn endpoint(&self, key: &str) -> String {
        self.api_url.clone().unwrap_or_else(|| {
            format!(
                "https://generativelanguage.googleapis.com/v1beta2/models/gemini-image-alpha:predict?key={}",
                key
            )
        })
    }
}

/// Gemini-compatible image analyzer.
pub struct GeminiVision {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiVision {
    /// Create an analyzer.
    pub fn new(config: GeminiConfig) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Create an analyzer from environment variables.
    pub fn from_env() -> Result<Self, ToolError> {
        Self::new(GeminiConfig::from_env())
    }
}

/// Build the request body for an image source.
pub fn analysis_payload(source: &ImageSource) -> Value {
    let input_image = match source {
        ImageSource::Url(uri) => json!([{ "uri": uri }]),
        ImageSource::Base64(bytes) => json!([{ "imageBytes": bytes }]),
    };
    json!({
        "prompt": { "text": ANALYSIS_INSTRUCTION },
        "input_image": input_image,
    })
}

/// Join the candidate contents, or fall back to the truncated raw payload.
pub fn extract_analysis_text(payload: &Value) -> String {
    let joined = payload
        .get("candidates")
        .and_then(Value::as_array)
        .map(|candidates| {
            candidates
                .iter()
                .map(|candidate| match candidate.get("content") {
                    Some(Value::String(text)) => text.clone(),
                    Some(Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    if !joined.is_empty() {
        return joined;
    }

    payload.to_string().chars().take(RAW_FALLBACK_CHARS).collect()
}

#[async_trait]
impl ImageAnalyzer for GeminiVision {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn analyze(&self, source: ImageSource) -> Result<ImageAnalysis, ToolError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            ToolError::Configuration("GEMINI_API_KEY not set in environment".to_string())
        })?;

        let kind = match &source {
            ImageSource::Url(_) => "url",
            ImageSource::Base64(_) => "inline",
        };
        debug!(source = kind, "Requesting image analysis");

        let response = self
            .client
            .post(self.config.endpoint(api_key))
            .json(&analysis_payload(&source))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ToolError::Service(format!(
                "Gemini API error: {} {}",
                status.as_u16(),
                text
            )));
        }

        let body = response.text().await?;
        let raw: Value = serde_json::from_str(&body)?;
        Ok(ImageAnalysis {
            analysis_text: extract_analysis_text(&raw),
            raw,
        })
    }
}
