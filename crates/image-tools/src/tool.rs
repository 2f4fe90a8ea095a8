//! Image tool traits and result types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// A generated image persisted to local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// File name, e.g. `sd_1717000000000_0.png`.
    pub filename: String,
    /// Storage locator (path of the written file).
    pub path: String,
}

/// Output of an image generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImages {
    /// Persisted images, possibly empty.
    pub images: Vec<GeneratedImage>,
    /// Raw provider payload.
    pub meta: Value,
}

/// Where the image to analyze comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A public image reference.
    Url(String),
    /// Inline base64-encoded bytes.
    Base64(String),
}

impl ImageSource {
    /// Pick a source from optional turn fields. A URL takes precedence.
    pub fn from_parts(url: Option<&str>, base64: Option<&str>) -> Option<Self> {
        let non_empty = |s: &&str| !s.is_empty();
        url.filter(non_empty)
            .map(|url| ImageSource::Url(url.to_string()))
            .or_else(|| {
                base64
                    .filter(non_empty)
                    .map(|b64| ImageSource::Base64(b64.to_string()))
            })
    }
}

/// Output of an image analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    /// Extracted analysis text.
    pub analysis_text: String,
    /// Raw provider payload.
    pub raw: Value,
}

/// Outcome of a single tool invocation, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResult {
    /// Images were generated.
    ImageGen {
        /// Persisted images.
        images: Vec<GeneratedImage>,
    },
    /// An image was analyzed.
    ImageAnalysis {
        /// Extracted analysis text.
        #[serde(rename = "analysisText")]
        analysis_text: String,
    },
    /// The tool failed.
    Failed {
        /// Error message.
        error: String,
    },
}

impl ToolResult {
    /// Whether the tool succeeded.
    pub fn is_success(&self) -> bool {
        !matches!(self, ToolResult::Failed { .. })
    }
}

impl From<&GeneratedImages> for ToolResult {
    fn from(generated: &GeneratedImages) -> Self {
        ToolResult::ImageGen {
            images: generated.images.clone(),
        }
    }
}

impl From<&ImageAnalysis> for ToolResult {
    fn from(analysis: &ImageAnalysis) -> Self {
        ToolResult::ImageAnalysis {
            analysis_text: analysis.analysis_text.clone(),
        }
    }
}

impl From<&ToolError> for ToolResult {
    fn from(error: &ToolError) -> Self {
        ToolResult::Failed {
            error: error.to_string(),
        }
    }
}

/// Generates images from a text prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Human-readable name of the backing service.
    fn name(&self) -> &str;

    /// Generate and persist images for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<GeneratedImages, ToolError>;
}

/// Describes the content of an image.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    /// Human-readable name of the backing service.
    fn name(&self) -> &str;

    /// Analyze the image.
    async fn analyze(&self, source: ImageSource) -> Result<ImageAnalysis, ToolError>;
}
