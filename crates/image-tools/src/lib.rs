//! Image generation and image analysis service clients.
//!
//! The orchestrator talks to these services through two narrow traits:
//!
//! - [`ImageGenerator`] - text prompt in, persisted PNG files out
//!   ([`StableDiffusion`] talks to a Stability-compatible endpoint)
//! - [`ImageAnalyzer`] - image URL or inline bytes in, description out
//!   ([`GeminiVision`] talks to a Gemini-compatible endpoint)
//!
//! Each invocation is summarised as a [`ToolResult`] for diagnostics.
//!
//! Missing credentials never fail construction. They surface as
//! [`ToolError::Configuration`] when the tool is called; every other failure
//! is a service error whose message can be shown to the user verbatim.
//!
//! # Example
//!
//! ```rust,ignore
//! use image_tools::{ImageGenerator, StableDiffusion};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), image_tools::ToolError> {
//!     let generator = StableDiffusion::from_env()?;
//!     let generated = generator.generate("a minimalist falcon logo").await?;
//!     for image in &generated.images {
//!         println!("{}", image.path);
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod gemini;
mod stability;
mod tool;

pub use error::ToolError;
pub use gemini::{
    analysis_payload, extract_analysis_text, GeminiConfig, GeminiVision, ANALYSIS_INSTRUCTION,
};
pub use stability::{
    extract_encoded_images, StabilityConfig, StableDiffusion, DEFAULT_OUTPUT_DIR,
    DEFAULT_STABILITY_URL,
};
pub use tool::{
    GeneratedImage, GeneratedImages, ImageAnalysis, ImageAnalyzer, ImageGenerator, ImageSource,
    ToolResult,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
