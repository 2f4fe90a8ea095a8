//! Intent routing and the image tool paths.

use std::sync::Arc;

use brain_core::{Deadline, GenerationOptions};
use image_tools::{ImageAnalyzer, ImageGenerator, ImageSource, ToolError, ToolResult};
use llama_brain::ModelInvoker;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::OrchestratorError;
use crate::intent::{Intent, IntentClassifier};
use crate::policy::{CallSite, Disposition};

/// Result of routing one turn.
///
/// For [`Intent::Text`] the response is the untouched user text; the caller
/// decides how to answer it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOutcome {
    /// The classified intent.
    pub intent: Intent,
    /// False when the tool failed.
    pub success: bool,
    /// Text for the user, set on success.
    pub final_response: Option<String>,
    /// Tool error message, set on failure.
    pub error: Option<String>,
    /// What the tool returned, if a tool ran.
    pub tool: Option<ToolResult>,
    /// Raw provider payload of the tool call, or the error payload when it failed.
    pub tool_meta: Option<Value>,
}

impl RouteOutcome {
    fn text(text: &str) -> Self {
        Self {
            intent: Intent::Text,
            success: true,
            final_response: Some(text.to_string()),
            error: None,
            tool: None,
            tool_meta: None,
        }
    }

    fn answered(intent: Intent, response: String, tool: ToolResult, meta: Value) -> Self {
        Self {
            intent,
            success: true,
            final_response: Some(response),
            error: None,
            tool: Some(tool),
            tool_meta: Some(meta),
        }
    }

    fn failed(intent: Intent, error: String, tool: Option<ToolResult>, meta: Option<Value>) -> Self {
        Self {
            intent,
            success: false,
            final_response: None,
            error: Some(error),
            tool,
            tool_meta: meta,
        }
    }
}

/// Classifies a turn and runs the matching image tool.
#[derive(Clone)]
pub struct Router {
    classifier: Arc<dyn IntentClassifier>,
    generator: Arc<dyn ImageGenerator>,
    analyzer: Arc<dyn ImageAnalyzer>,
    invoker: ModelInvoker,
}

impl Router {
    /// Create a router.
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        generator: Arc<dyn ImageGenerator>,
        analyzer: Arc<dyn ImageAnalyzer>,
        invoker: ModelInvoker,
    ) -> Self {
        Self {
            classifier,
            generator,
            analyzer,
            invoker,
        }
    }

    /// Classify `text` and run the tool path it selects.
    ///
    /// Tool failures come back as an unsuccessful outcome. Only a missing
    /// credential makes this return `Err`.
    pub async fn route(
        &self,
        text: &str,
        image: Option<ImageSource>,
        deadline: Deadline,
    ) -> Result<RouteOutcome, OrchestratorError> {
        let intent = self.classifier.classify(text, image.is_some());
        info!(%intent, has_image = image.is_some(), "Routed turn");

        match intent {
            Intent::Text => Ok(RouteOutcome::text(text)),
            Intent::GenerateImage => self.generate(text, deadline).await,
            Intent::AnalyzeImage => match image {
                Some(source) => self.analyze(text, source, deadline).await,
                None => Ok(RouteOutcome::failed(
                    intent,
                    "no image provided for analysis".to_string(),
                    None,
                    None,
                )),
            },
        }
    }

    async fn generate(&self, prompt: &str, deadline: Deadline) -> Result<RouteOutcome, OrchestratorError> {
        let intent = Intent::GenerateImage;
        debug!(tool = self.generator.name(), "Calling image generator");

        let generated = match deadline.run(self.generator.generate(prompt)).await {
            Ok(Ok(generated)) => generated,
            Ok(Err(e)) => return tool_failure(intent, CallSite::ImageGeneration, e, None),
            Err(_) => {
                return tool_failure(intent, CallSite::ImageGeneration, ToolError::Timeout, None)
            }
        };

        let Some(first) = generated.images.first() else {
            return tool_failure(
                intent,
                CallSite::ImageGeneration,
                ToolError::Service("image generation returned no images".to_string()),
                Some(generated.meta),
            );
        };

        let instruction = caption_prompt(&first.path, prompt);
        let reply = self
            .invoker
            .invoke_until(instruction, GenerationOptions::default(), deadline)
            .await;

        Ok(RouteOutcome::answered(
            intent,
            reply.into_display(),
            ToolResult::from(&generated),
            generated.meta,
        ))
    }

    async fn analyze(
        &self,
        question: &str,
        source: ImageSource,
        deadline: Deadline,
    ) -> Result<RouteOutcome, OrchestratorError> {
        let intent = Intent::AnalyzeImage;
        debug!(tool = self.analyzer.name(), "Calling image analyzer");

        let analysis = match deadline.run(self.analyzer.analyze(source)).await {
            Ok(Ok(analysis)) => analysis,
            Ok(Err(e)) => return tool_failure(intent, CallSite::ImageAnalysis, e, None),
            Err(_) => return tool_failure(intent, CallSite::ImageAnalysis, ToolError::Timeout, None),
        };

        let instruction = analysis_prompt(&analysis.analysis_text, question);
        let reply = self
            .invoker
            .invoke_until(instruction, GenerationOptions::default(), deadline)
            .await;

        Ok(RouteOutcome::answered(
            intent,
            reply.into_display(),
            ToolResult::from(&analysis),
            analysis.raw,
        ))
    }
}

/// Turn a tool error into an outcome. `payload` is whatever the provider
/// returned before the failure was detected; without one the error itself is
/// recorded as the debug payload.
fn tool_failure(
    intent: Intent,
    site: CallSite,
    error: ToolError,
    payload: Option<Value>,
) -> Result<RouteOutcome, OrchestratorError> {
    let site = if error.is_configuration() {
        CallSite::Credentials
    } else {
        site
    };
    warn!(%intent, call_site = ?site, "Tool failed: {}", error);

    let tool = ToolResult::from(&error);
    let meta = payload.unwrap_or_else(|| json!({ "error": error.to_string() }));
    match site.handle(&error) {
        Disposition::Abort(message) => Err(OrchestratorError::Configuration(message)),
        Disposition::Surface(message) => {
            Ok(RouteOutcome::failed(intent, message, Some(tool), Some(meta)))
        }
        Disposition::Masked => Ok(RouteOutcome::failed(
            intent,
            error.to_string(),
            Some(tool),
            Some(meta),
        )),
    }
}

/// Instruction asking the model to caption a generated image.
pub fn caption_prompt(path: &str, prompt: &str) -> String {
    format!(
        "The image generation service produced an image at path: {}. Please craft a user-facing message that includes the image URL or path and a short caption based on the original request: \"{}\"",
        path, prompt
    )
}

/// Instruction asking the model to answer a question from an image analysis.
pub fn analysis_prompt(analysis: &str, question: &str) -> String {
    format!(
        "The image analysis service returned the following analysis:\n{}\n\nPlease use this analysis to answer the user's original question: \"{}\"",
        analysis, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::intent::KeywordClassifier;
    use mock_brain::{DelayedBrain, EchoBrain, MockImageAnalyzer, MockImageGenerator, ScriptedBrain};

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(5))
    }

    fn router(
        generator: Arc<MockImageGenerator>,
        analyzer: Arc<MockImageAnalyzer>,
        brain: Arc<ScriptedBrain>,
    ) -> Router {
        Router::new(
            Arc::new(KeywordClassifier::standard().unwrap()),
            generator,
            analyzer,
            ModelInvoker::fallback_only(brain),
        )
    }

    #[tokio::test]
    async fn test_text_intent_passes_through() {
        let brain = Arc::new(ScriptedBrain::new());
        let router = router(
            Arc::new(MockImageGenerator::single("/tmp/a.png")),
            Arc::new(MockImageAnalyzer::describing("cat")),
            brain.clone(),
        );

        let outcome = router.route("كيف حالك", None, deadline()).await.unwrap();
        assert_eq!(outcome.intent, Intent::Text);
        assert!(outcome.success);
        assert_eq!(outcome.final_response.as_deref(), Some("كيف حالك"));
        assert_eq!(brain.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generation_captions_first_image() {
        let generator = Arc::new(MockImageGenerator::single("./generated_images/sd_1_0.png"));
        let brain = Arc::new(ScriptedBrain::with_replies(["Here is your logo"]));
        let router = router(
            generator.clone(),
            Arc::new(MockImageAnalyzer::describing("unused")),
            brain.clone(),
        );

        let outcome = router.route("ارسم شعار", None, deadline()).await.unwrap();
        assert_eq!(outcome.intent, Intent::GenerateImage);
        assert!(outcome.success);
        assert_eq!(outcome.final_response.as_deref(), Some("Here is your logo"));
        assert!(matches!(outcome.tool, Some(ToolResult::ImageGen { ref images }) if images.len() == 1));
        assert_eq!(generator.prompts(), vec!["ارسم شعار".to_string()]);

        let prompt = brain.requests()[0].input.to_prompt();
        assert!(prompt.contains("./generated_images/sd_1_0.png"));
        assert!(prompt.contains("\"ارسم شعار\""));
    }

    #[tokio::test]
    async fn test_generation_failure_skips_model() {
        let brain = Arc::new(ScriptedBrain::new());
        let router = router(
            Arc::new(MockImageGenerator::failing("Stable Diffusion API error: 500 down")),
            Arc::new(MockImageAnalyzer::describing("unused")),
            brain.clone(),
        );

        let outcome = router.route("draw a cat", None, deadline()).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(
            outcome.error.as_deref(),
            Some("Stable Diffusion API error: 500 down")
        );
        assert!(matches!(outcome.tool, Some(ToolResult::Failed { .. })));
        assert_eq!(
            outcome.tool_meta,
            Some(json!({ "error": "Stable Diffusion API error: 500 down" }))
        );
        assert_eq!(brain.call_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_images_is_a_failure() {
        let brain = Arc::new(ScriptedBrain::new());
        let router = router(
            Arc::new(MockImageGenerator::empty()),
            Arc::new(MockImageAnalyzer::describing("unused")),
            brain.clone(),
        );

        let outcome = router.route("generate a logo", None, deadline()).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(
            outcome.error.as_deref(),
            Some("image generation returned no images")
        );
        assert_eq!(outcome.tool_meta, Some(json!({ "artifacts": 0 })));
        assert_eq!(brain.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_credentials_abort() {
        let router = router(
            Arc::new(MockImageGenerator::unconfigured()),
            Arc::new(MockImageAnalyzer::describing("unused")),
            Arc::new(ScriptedBrain::new()),
        );

        let err = router.route("صمم شعار", None, deadline()).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_analysis_answers_question() {
        let analyzer = Arc::new(MockImageAnalyzer::describing("A cat on a sofa"));
        let brain = Arc::new(ScriptedBrain::with_replies(["It's a cat"]));
        let router = router(
            Arc::new(MockImageGenerator::single("/tmp/a.png")),
            analyzer.clone(),
            brain.clone(),
        );

        let image = ImageSource::Url("https://img.test/cat.jpg".to_string());
        let outcome = router
            .route("ما في هذه الصورة", Some(image.clone()), deadline())
            .await
            .unwrap();

        assert_eq!(outcome.intent, Intent::AnalyzeImage);
        assert_eq!(outcome.final_response.as_deref(), Some("It's a cat"));
        assert_eq!(analyzer.sources(), vec![image]);
        let prompt = brain.requests()[0].input.to_prompt();
        assert!(prompt.contains("A cat on a sofa"));
    }

    #[tokio::test]
    async fn test_model_failure_after_tool_is_returned_as_text() {
        let router = Router::new(
            Arc::new(KeywordClassifier::standard().unwrap()),
            Arc::new(MockImageGenerator::single("/tmp/a.png")),
            Arc::new(MockImageAnalyzer::describing("unused")),
            ModelInvoker::fallback_only(Arc::new(mock_brain::FailingBrain::new("down"))),
        );

        let outcome = router.route("draw", None, deadline()).await.unwrap();
        assert!(outcome.success);
        assert!(outcome
            .final_response
            .unwrap()
            .starts_with(llama_brain::ENGINE_ERROR_PREFIX));
    }

    #[tokio::test]
    async fn test_slow_caption_respects_deadline() {
        let slow = Arc::new(DelayedBrain::with_secs(EchoBrain::new(), 5));
        let router = Router::new(
            Arc::new(KeywordClassifier::standard().unwrap()),
            Arc::new(MockImageGenerator::single("/tmp/a.png")),
            Arc::new(MockImageAnalyzer::describing("unused")),
            ModelInvoker::fallback_only(slow.clone()),
        );

        let outcome = router
            .route("draw", None, Deadline::after(Duration::from_millis(50)))
            .await
            .unwrap();
        assert!(outcome.final_response.unwrap().contains("timed out"));
        assert_eq!(slow.completed(), 0);
    }
}
