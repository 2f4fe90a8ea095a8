//! Mock image tools with canned results and call counters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use image_tools::{
    GeneratedImage, GeneratedImages, ImageAnalysis, ImageAnalyzer, ImageGenerator, ImageSource,
    ToolError,
};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
enum Behavior<T> {
    Succeed(T),
    Fail(String),
    Unconfigured(String),
}

impl<T: Clone> Behavior<T> {
    fn outcome(&self) -> Result<T, ToolError> {
        match self {
            Behavior::Succeed(value) => Ok(value.clone()),
            Behavior::Fail(message) => Err(ToolError::Service(message.clone())),
            Behavior::Unconfigured(message) => Err(ToolError::Configuration(message.clone())),
        }
    }
}

/// An image generator returning a fixed outcome.
#[derive(Debug)]
pub struct MockImageGenerator {
    behavior: Behavior<GeneratedImages>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockImageGenerator {
    fn with_behavior(behavior: Behavior<GeneratedImages>) -> Self {
        Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Succeed with one image at `path`.
    pub fn single(path: impl Into<String>) -> Self {
        let path = path.into();
        let filename = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self::returning(vec![GeneratedImage { filename, path }])
    }

    /// Succeed with the given images.
    pub fn returning(images: Vec<GeneratedImage>) -> Self {
        let meta = json!({ "artifacts": images.len() });
        Self::with_behavior(Behavior::Succeed(GeneratedImages { images, meta }))
    }

    /// Succeed with an empty image list.
    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }

    /// Fail with a service error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    /// Fail with a configuration error.
    pub fn unconfigured() -> Self {
        Self::with_behavior(Behavior::Unconfigured(
            "STABILITY_API_KEY not set in environment".to_string(),
        ))
    }

    /// Number of `generate` calls.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    fn name(&self) -> &str {
        "mock_generator"
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedImages, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());
        self.behavior.outcome()
    }
}

/// An image analyzer returning a fixed outcome.
#[derive(Debug)]
pub struct MockImageAnalyzer {
    behavior: Behavior<ImageAnalysis>,
    sources: Mutex<Vec<ImageSource>>,
    calls: AtomicUsize,
}

impl MockImageAnalyzer {
    fn with_behavior(behavior: Behavior<ImageAnalysis>) -> Self {
        Self {
            behavior,
            sources: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Succeed with `text` as the analysis.
    pub fn describing(text: impl Into<String>) -> Self {
        let analysis_text = text.into();
        let raw: Value = json!({ "candidates": [{ "content": analysis_text }] });
        Self::with_behavior(Behavior::Succeed(ImageAnalysis { analysis_text, raw }))
    }

    /// Fail with a service error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    /// Fail with a configuration error.
    pub fn unconfigured() -> Self {
        Self::with_behavior(Behavior::Unconfigured(
            "GEMINI_API_KEY not set in environment".to_string(),
        ))
    }

    /// Number of `analyze` calls.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Sources received so far.
    pub fn sources(&self) -> Vec<ImageSource> {
        self.sources.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ImageAnalyzer for MockImageAnalyzer {
    fn name(&self) -> &str {
        "mock_analyzer"
    }

    async fn analyze(&self, source: ImageSource) -> Result<ImageAnalysis, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sources
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(source);
        self.behavior.outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generator_records_prompts() {
        let generator = MockImageGenerator::single("generated_images/sd_1_0.png");
        let generated = generator.generate("logo").await.unwrap();

        assert_eq!(generated.images[0].filename, "sd_1_0.png");
        assert_eq!(generator.prompts(), vec!["logo".to_string()]);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_tools() {
        let err = MockImageGenerator::unconfigured()
            .generate("x")
            .await
            .unwrap_err();
        assert!(err.is_configuration());

        let analyzer = MockImageAnalyzer::unconfigured();
        let err = analyzer
            .analyze(ImageSource::Url("u".to_string()))
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(analyzer.sources().len(), 1);
    }
}
