//! Image generation through a Stability-compatible HTTP API.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ToolError;
use crate::tool::{GeneratedImage, GeneratedImages, ImageGenerator};

/// Default generation endpoint.
pub const DEFAULT_STABILITY_URL: &str = "https://api.stability.ai/v2beta/stable-image/generate/sd3";

/// Default directory generated images are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "generated_images";

/// Payload fields that may hold the image list, in lookup order.
const IMAGE_LIST_FIELDS: [&str; 3] = ["artifacts", "output", "images"];

/// Entry fields that may hold base64 image data, in lookup order.
const IMAGE_DATA_FIELDS: [&str; 4] = ["base64", "b64", "b64_image", "data"];

/// Configuration for [`StableDiffusion`].
#[derive(Debug, Clone)]
pub struct StabilityConfig {
    /// Bearer token. Calls fail with a configuration error without it.
    pub api_key: Option<String>,
    /// Generation endpoint.
    pub api_url: String,
    /// Directory generated images are written to.
    pub output_dir: PathBuf,
    /// Requested image width.
    pub width: u32,
    /// Requested image height.
    pub height: u32,
    /// Requested number of images.
    pub samples: u32,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_STABILITY_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            width: 1024,
            height: 1024,
            samples: 1,
            timeout_secs: 120,
        }
    }
}

impl StabilityConfig {
    /// Read `STABILITY_API_KEY`, `STABILITY_API_URL` and `GENERATED_IMAGES_DIR`.
    ///
    /// Never fails; a missing key is reported when the generator is called.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env::var("STABILITY_API_KEY").ok().filter(|k| !k.is_empty()),
            api_url: env::var("STABILITY_API_URL").unwrap_or(defaults.api_url),
            output_dir: env::var("GENERATED_IMAGES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            ..defaults
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    width: u32,
    height: u32,
    samples: u32,
}

/// Stability-compatible image generator.
pub struct StableDiffusion {
    client: reqwest::Client,
    config: StabilityConfig,
}

impl StableDiffusion {
    /// Create a generator.
    pub fn new(config: StabilityConfig) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Create a generator from environment variables.
    pub fn from_env() -> Result<Self, ToolError> {
        Self::new(StabilityConfig::from_env())
    }

    /// The active configuration.
    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    async fn persist(&self, encoded: &[String]) -> Result<Vec<GeneratedImage>, ToolError> {
        if encoded.is_empty() {
            return Ok(Vec::new());
        }

        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        let now = Utc::now().timestamp_millis();
        let mut images = Vec::with_capacity(encoded.len());

        for data in encoded {
            let bytes = match base64::engine::general_purpose::STANDARD.decode(data.trim()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Skipping undecodable image entry: {}", e);
                    continue;
                }
            };

            let filename = format!("sd_{}_{}.png", now, images.len());
            let path = self.config.output_dir.join(&filename);
            tokio::fs::write(&path, bytes).await?;

            images.push(GeneratedImage {
                filename,
                path: path_string(&path),
            });
        }

        Ok(images)
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// Collect the base64 strings of every recognisable image entry.
///
/// The first list field present wins, even when it is empty. Entries with no
/// recognisable data field are skipped.
pub fn extract_encoded_images(payload: &Value) -> Vec<String> {
    let list = IMAGE_LIST_FIELDS
        .iter()
        .filter_map(|field| payload.get(*field))
        .find(|value| !value.is_null() && value.as_str() != Some(""));

    let Some(Value::Array(entries)) = list else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            if let Some(data) = non_empty_str(entry) {
                return Some(data.to_string());
            }
            IMAGE_DATA_FIELDS
                .iter()
                .filter_map(|field| entry.get(*field))
                .find_map(non_empty_str)
                .map(str::to_string)
        })
        .collect()
}

#[async_trait]
impl ImageGenerator for StableDiffusion {
    fn name(&self) -> &str {
        "stable_diffusion"
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedImages, ToolError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            ToolError::Configuration("STABILITY_API_KEY not set in environment".to_string())
        })?;

        let body = GenerateRequest {
            prompt,
            width: self.config.width,
            height: self.config.height,
            samples: self.config.samples,
        };

        debug!(url = %self.config.api_url, "Requesting image generation");

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ToolError::Service(format!(
                "Stable Diffusion API error: {} {}",
                status.as_u16(),
                text
            )));
        }

        let body = response.text().await?;
        let meta: Value = serde_json::from_str(&body)?;
        let images = self.persist(&extract_encoded_images(&meta)).await?;

        info!(count = images.len(), "Image generation finished");

        Ok(GeneratedImages { images, meta })
    }
}
