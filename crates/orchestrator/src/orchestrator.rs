//! The public entrypoint and the conversation-level chat service.

use std::sync::Arc;

use brain_core::{
    Conversation, ConversationStore, Deadline, FactStore, InMemoryConversationStore,
    InMemoryFactStore, StoredMessage, Turn,
};
use image_tools::{GeminiVision, ImageAnalyzer, ImageGenerator, ImageSource, StableDiffusion, ToolResult};
use llama_brain::ModelInvoker;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::chat::ChatEngine;
use crate::config::OrchestratorConfig;
use crate::error::OrchestratorError;
use crate::intent::{Intent, IntentClassifier, KeywordClassifier};
use crate::persona::Persona;
use crate::prompt::PromptAssembler;
use crate::router::{RouteOutcome, Router};
use crate::title::TitleGenerator;

/// One user turn as received by [`Orchestrator::handle_user_turn`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnInput {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl TurnInput {
    /// A text-only turn.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Attach a public image reference.
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Attach inline base64 image bytes.
    pub fn with_image_base64(mut self, data: impl Into<String>) -> Self {
        self.image_base64 = Some(data.into());
        self
    }

    /// Set the user the turn belongs to.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    fn image(&self) -> Option<ImageSource> {
        ImageSource::from_parts(self.image_url.as_deref(), self.image_base64.as_deref())
    }
}

/// Diagnostics attached to a turn outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnDebug {
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_meta: Option<Value>,
}

/// Result of [`Orchestrator::handle_user_turn`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_model_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolResult>,
    pub debug: TurnDebug,
}

impl From<RouteOutcome> for TurnOutcome {
    fn from(outcome: RouteOutcome) -> Self {
        Self {
            success: outcome.success,
            final_model_response: outcome.final_response,
            error: outcome.error,
            tools: outcome.tool,
            debug: TurnDebug {
                intent: outcome.intent,
                tool_meta: outcome.tool_meta,
            },
        }
    }
}

/// A chat message sent to [`Orchestrator::send_message`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub user_id: String,
    #[serde(default)]
    pub conversation_id: Option<u64>,
    pub message: String,
    #[serde(default)]
    pub use_deep_thinking: bool,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl SendMessage {
    /// A message starting a new conversation.
    pub fn new(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// Continue an existing conversation.
    pub fn in_conversation(mut self, conversation_id: u64) -> Self {
        self.conversation_id = Some(conversation_id);
        self
    }

    /// Answer with the two-phase deep thinking pipeline.
    pub fn deep_thinking(mut self) -> Self {
        self.use_deep_thinking = true;
        self
    }

    /// Attach a public image reference.
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// Reply to [`Orchestrator::send_message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageReply {
    pub conversation_id: u64,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_process: Option<String>,
    pub intent: Intent,
}

/// Coordinates routing, image tools, plain chat and conversation storage.
///
/// Every turn gets one [`Deadline`] from [`OrchestratorConfig::turn_timeout`],
/// shared by the tool call and every model call of that turn.
pub struct Orchestrator {
    router: Router,
    chat: ChatEngine,
    titles: TitleGenerator,
    conversations: Arc<dyn ConversationStore>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Start building an orchestrator.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Create an orchestrator from environment variables.
    ///
    /// Conversations and facts are kept in memory.
    pub fn from_env() -> Result<Self, OrchestratorError> {
        let config = OrchestratorConfig::from_env();
        let invoker = ModelInvoker::from_env()?;
        let generator = StableDiffusion::from_env()
            .map_err(|e| OrchestratorError::Configuration(format!("image generator: {}", e)))?;
        let analyzer = GeminiVision::from_env()
            .map_err(|e| OrchestratorError::Configuration(format!("image analyzer: {}", e)))?;
        let persona = Persona::load(&config.persona_file);

        info!(strategy = %invoker.strategy(), "Orchestrator configured from environment");

        Self::builder()
            .invoker(invoker)
            .generator(Arc::new(generator))
            .analyzer(Arc::new(analyzer))
            .persona(persona)
            .config(config)
            .build()
    }

    /// The active configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    fn deadline(&self) -> Deadline {
        Deadline::after(self.config.turn_timeout)
    }

    /// Route one turn and run its tool path.
    ///
    /// Text turns are passed through unchanged, including an empty turn with
    /// no image; use [`send_message`] for a chat answer.
    ///
    /// [`send_message`]: Orchestrator::send_message
    pub async fn handle_user_turn(&self, input: TurnInput) -> Result<TurnOutcome, OrchestratorError> {
        let image = input.image();
        let text = input.text.as_deref().unwrap_or_default();

        debug!(user_id = ?input.user_id, "Handling user turn");
        let outcome = self.router.route(text, image, self.deadline()).await?;
        Ok(outcome.into())
    }

    /// Send a chat message, creating the conversation when needed.
    pub async fn send_message(&self, request: SendMessage) -> Result<SendMessageReply, OrchestratorError> {
        if request.message.trim().is_empty() {
            return Err(OrchestratorError::InvalidInput("message is empty".to_string()));
        }

        let deadline = self.deadline();
        let user_id = request.user_id.as_str();

        let conversation = match request.conversation_id {
            Some(id) => self.conversations.get_conversation(user_id, id).await?,
            None => {
                let title = self.titles.summarize(&request.message, deadline).await?;
                self.conversations.create_conversation(user_id, &title).await?
            }
        };
        let conversation_id = conversation.id;

        let history: Vec<Turn> = self
            .conversations
            .messages(user_id, conversation_id)
            .await?
            .iter()
            .map(StoredMessage::to_turn)
            .collect();

        self.conversations
            .append_message(user_id, conversation_id, StoredMessage::user(&request.message))
            .await?;

        let image = ImageSource::from_parts(request.image_url.as_deref(), request.image_base64.as_deref());
        let outcome = self.router.route(&request.message, image, deadline).await?;
        let intent = outcome.intent;

        info!(user_id, conversation_id, %intent, "Processing chat message");

        if !outcome.success {
            let error = outcome
                .error
                .unwrap_or_else(|| "tool call failed".to_string());
            warn!(user_id, conversation_id, "Tool path failed: {}", error);
            return Err(OrchestratorError::ToolFailed(error));
        }

        let (response, thinking_process) = if intent == Intent::Text {
            let reply = self
                .chat
                .respond(
                    Some(user_id),
                    &request.message,
                    &history,
                    request.use_deep_thinking,
                    deadline,
                )
                .await?;
            (reply.response, reply.thinking_process)
        } else {
            (outcome.final_response.unwrap_or_default(), None)
        };

        self.conversations
            .append_message(
                user_id,
                conversation_id,
                StoredMessage::assistant(&response).with_thinking(thinking_process.clone()),
            )
            .await?;

        Ok(SendMessageReply {
            conversation_id,
            response,
            thinking_process,
            intent,
        })
    }

    /// Conversations of a user, most recently updated first.
    pub async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>, OrchestratorError> {
        Ok(self.conversations.list_conversations(user_id).await?)
    }

    /// Messages of one conversation, oldest first.
    pub async fn conversation_messages(
        &self,
        user_id: &str,
        conversation_id: u64,
    ) -> Result<Vec<StoredMessage>, OrchestratorError> {
        Ok(self.conversations.messages(user_id, conversation_id).await?)
    }

    /// Delete a conversation and its messages.
    pub async fn delete_conversation(
        &self,
        user_id: &str,
        conversation_id: u64,
    ) -> Result<(), OrchestratorError> {
        self.conversations
            .delete_conversation(user_id, conversation_id)
            .await?;
        info!(user_id, conversation_id, "Deleted conversation");
        Ok(())
    }
}

/// Builder for [`Orchestrator`].
///
/// The invoker and both image tools are required; everything else has an
/// in-memory or built-in default.
#[derive(Default)]
pub struct OrchestratorBuilder {
    invoker: Option<ModelInvoker>,
    generator: Option<Arc<dyn ImageGenerator>>,
    analyzer: Option<Arc<dyn ImageAnalyzer>>,
    classifier: Option<Arc<dyn IntentClassifier>>,
    facts: Option<Arc<dyn FactStore>>,
    conversations: Option<Arc<dyn ConversationStore>>,
    persona: Option<Persona>,
    config: OrchestratorConfig,
}

impl OrchestratorBuilder {
    /// Set the model invoker.
    pub fn invoker(mut self, invoker: ModelInvoker) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// Set the image generator.
    pub fn generator(mut self, generator: Arc<dyn ImageGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the image analyzer.
    pub fn analyzer(mut self, analyzer: Arc<dyn ImageAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Replace the keyword classifier.
    pub fn classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Set the fact store.
    pub fn facts(mut self, facts: Arc<dyn FactStore>) -> Self {
        self.facts = Some(facts);
        self
    }

    /// Set the conversation store.
    pub fn conversations(mut self, conversations: Arc<dyn ConversationStore>) -> Self {
        self.conversations = Some(conversations);
        self
    }

    /// Set the persona.
    pub fn persona(mut self, persona: Persona) -> Self {
        self.persona = Some(persona);
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Result<Orchestrator, OrchestratorError> {
        let invoker = self
            .invoker
            .ok_or_else(|| OrchestratorError::Configuration("model invoker not set".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| OrchestratorError::Configuration("image generator not set".to_string()))?;
        let analyzer = self
            .analyzer
            .ok_or_else(|| OrchestratorError::Configuration("image analyzer not set".to_string()))?;
        let classifier: Arc<dyn IntentClassifier> = match self.classifier {
            Some(classifier) => classifier,
            None => Arc::new(KeywordClassifier::standard()?),
        };
        let facts = self
            .facts
            .unwrap_or_else(|| Arc::new(InMemoryFactStore::new()));
        let conversations = self
            .conversations
            .unwrap_or_else(|| Arc::new(InMemoryConversationStore::new()));
        let persona = Arc::new(self.persona.unwrap_or_default());
        let config = self.config;

        let assembler = PromptAssembler::new(persona.clone())
            .with_exemplar_limit(config.exemplar_limit)
            .with_history_window(config.history_window);

        Ok(Orchestrator {
            router: Router::new(classifier, generator, analyzer, invoker.clone()),
            chat: ChatEngine::new(invoker.clone(), assembler, facts, persona),
            titles: TitleGenerator::new(invoker),
            conversations,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mock_brain::{EchoBrain, MockImageAnalyzer, MockImageGenerator};
    use serde_json::json;

    #[test]
    fn test_builder_requires_tools() {
        let err = Orchestrator::builder()
            .invoker(ModelInvoker::fallback_only(Arc::new(EchoBrain::new())))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, OrchestratorError::Configuration(msg) if msg.contains("generator")));
    }

    #[test]
    fn test_turn_input_deserializes_camel_case() {
        let input: TurnInput = serde_json::from_value(json!({
            "text": "hi",
            "imageUrl": "https://img.test/a.png",
            "userId": "u1"
        }))
        .unwrap();
        assert_eq!(
            input,
            TurnInput::text("hi")
                .with_image_url("https://img.test/a.png")
                .with_user("u1")
        );
        assert_eq!(
            input.image(),
            Some(ImageSource::Url("https://img.test/a.png".to_string()))
        );
    }

    #[test]
    fn test_turn_outcome_serializes_debug_payload() {
        let outcome = TurnOutcome {
            success: true,
            final_model_response: Some("done".to_string()),
            error: None,
            tools: Some(ToolResult::ImageAnalysis {
                analysis_text: "cat".to_string(),
            }),
            debug: TurnDebug {
                intent: Intent::AnalyzeImage,
                tool_meta: Some(json!({"candidates": []})),
            },
        };

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["finalModelResponse"], "done");
        assert_eq!(value["tools"]["type"], "image_analysis");
        assert_eq!(value["debug"]["intent"], "analyze_image");
        assert!(value.get("error").is_none());
    }

    #[tokio::test]
    async fn test_empty_turn_passes_through_as_text() {
        let generator = Arc::new(MockImageGenerator::single("/tmp/a.png"));
        let orchestrator = Orchestrator::builder()
            .invoker(ModelInvoker::fallback_only(Arc::new(EchoBrain::new())))
            .generator(generator.clone())
            .analyzer(Arc::new(MockImageAnalyzer::describing("cat")))
            .build()
            .unwrap();

        let outcome = orchestrator
            .handle_user_turn(TurnInput::default())
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.final_model_response.as_deref(), Some(""));
        assert_eq!(outcome.debug.intent, Intent::Text);
        assert!(outcome.tools.is_none());
        assert_eq!(generator.call_count(), 0);
    }
}
