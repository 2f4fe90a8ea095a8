//! The model invoker: primary engine, local fallback, never an `Err`.

use std::sync::Arc;
use std::time::Duration;

use brain_core::{Brain, BrainError, Completion, Deadline, GenerationOptions, GenerationRequest, PromptInput};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::brain::ChatCompletionBrain;
use crate::config::{EngineStrategy, LlamaBrainConfig};
use crate::local::LocalHttpBrain;

/// Prefix of the error string returned when every engine failed.
pub const ENGINE_ERROR_PREFIX: &str = "Error: unable to call Llama engine. ";

/// Outcome of a model invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// Generated text.
    Text(String),
    /// A payload with no text field.
    Structured(Value),
    /// Every engine failed; the string starts with [`ENGINE_ERROR_PREFIX`].
    Failed(String),
}

impl ModelReply {
    /// The text if this reply is text-shaped.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ModelReply::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether every engine failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, ModelReply::Failed(_))
    }

    /// Render the reply for display. Structured payloads become compact JSON
    /// and failures keep their tagged error string.
    pub fn into_display(self) -> String {
        match self {
            ModelReply::Text(text) => text,
            ModelReply::Structured(value) => value.to_string(),
            ModelReply::Failed(message) => message,
        }
    }
}

impl From<Completion> for ModelReply {
    fn from(completion: Completion) -> Self {
        match completion {
            Completion::Text(text) => ModelReply::Text(text),
            Completion::Structured(value) => ModelReply::Structured(value),
        }
    }
}

/// Invokes the configured engines in order.
#[derive(Clone)]
pub struct ModelInvoker {
    primary: Option<Arc<dyn Brain>>,
    fallback: Arc<dyn Brain>,
    defaults: GenerationOptions,
    call_timeout: Duration,
}

impl ModelInvoker {
    /// An invoker that only uses `fallback`.
    pub fn fallback_only(fallback: Arc<dyn Brain>) -> Self {
        Self {
            primary: None,
            fallback,
            defaults: GenerationOptions::default().temperature(0.2).max_tokens(512),
            call_timeout: Duration::from_secs(60),
        }
    }

    /// Try `primary` before the fallback.
    pub fn with_primary(mut self, primary: Arc<dyn Brain>) -> Self {
        self.primary = Some(primary);
        self
    }

    /// Sampling defaults for requests that leave options unset.
    pub fn with_defaults(mut self, defaults: GenerationOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Deadline applied by [`ModelInvoker::invoke`].
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Build both engines from configuration.
    pub fn from_config(config: &LlamaBrainConfig) -> Result<Self, BrainError> {
        let fallback: Arc<dyn Brain> = Arc::new(LocalHttpBrain::new(config)?);
        let mut invoker = Self::fallback_only(fallback)
            .with_defaults(
                GenerationOptions::default()
                    .temperature(config.temperature)
                    .max_tokens(config.max_tokens),
            )
            .with_call_timeout(Duration::from_secs(config.timeout_secs));

        match config.effective_strategy() {
            EngineStrategy::PrimaryWithFallback => {
                invoker = invoker.with_primary(Arc::new(ChatCompletionBrain::new(config)?));
            }
            EngineStrategy::FallbackOnly => {
                if config.strategy == EngineStrategy::PrimaryWithFallback {
                    info!("LLM_API_KEY not set, using the local engine only");
                }
            }
        }

        Ok(invoker)
    }

    /// Build the invoker from environment variables.
    pub fn from_env() -> Result<Self, BrainError> {
        Self::from_config(&LlamaBrainConfig::from_env()?)
    }

    /// The strategy this invoker runs with.
    pub fn strategy(&self) -> EngineStrategy {
        if self.primary.is_some() {
            EngineStrategy::PrimaryWithFallback
        } else {
            EngineStrategy::FallbackOnly
        }
    }

    /// Invoke with the invoker's own call timeout.
    pub async fn invoke(
        &self,
        input: impl Into<PromptInput>,
        options: GenerationOptions,
    ) -> ModelReply {
        self.invoke_until(input, options, Deadline::after(self.call_timeout))
            .await
    }

    /// Invoke, giving up once `deadline` passes.
    pub async fn invoke_until(
        &self,
        input: impl Into<PromptInput>,
        options: GenerationOptions,
        deadline: Deadline,
    ) -> ModelReply {
        let request = GenerationRequest::new(input).with_options(options.or(self.defaults));

        if let Some(primary) = &self.primary {
            match deadline.run(primary.generate(request.clone())).await {
                Ok(Ok(completion)) => {
                    debug!(engine = primary.name(), "Primary engine answered");
                    return completion.into();
                }
                Ok(Err(e)) => {
                    warn!(engine = primary.name(), "Primary engine failed, falling back: {}", e);
                }
                Err(e) => {
                    warn!(engine = primary.name(), "Primary engine {}, falling back", e);
                }
            }
        }

        match deadline.run(self.fallback.generate(request)).await {
            Ok(Ok(completion)) => completion.into(),
            Ok(Err(e)) | Err(e) => {
                warn!(engine = self.fallback.name(), "Fallback engine failed: {}", e);
                ModelReply::Failed(format!("{}{}", ENGINE_ERROR_PREFIX, e))
            }
        }
    }
}

impl std::fmt::Debug for ModelInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelInvoker")
            .field("primary", &self.primary.as_ref().map(|b| b.name().to_string()))
            .field("fallback", &self.fallback.name())
            .field("defaults", &self.defaults)
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_from_completion() {
        assert_eq!(
            ModelReply::from(Completion::text("hi")),
            ModelReply::Text("hi".to_string())
        );
        let structured = ModelReply::from(Completion::Structured(json!({"a": 1})));
        assert_eq!(structured.as_text(), None);
        assert_eq!(structured.into_display(), r#"{"a":1}"#);
    }

    #[test]
    fn test_failed_reply_display() {
        let reply = ModelReply::Failed(format!("{}boom", ENGINE_ERROR_PREFIX));
        assert!(reply.is_failed());
        assert_eq!(
            reply.into_display(),
            "Error: unable to call Llama engine. boom"
        );
    }

    #[test]
    fn test_from_config_without_key_is_fallback_only() {
        let invoker = ModelInvoker::from_config(&LlamaBrainConfig::default()).unwrap();
        assert_eq!(invoker.strategy(), EngineStrategy::FallbackOnly);

        let invoker =
            ModelInvoker::from_config(&LlamaBrainConfig::builder().api_key("k").build()).unwrap();
        assert_eq!(invoker.strategy(), EngineStrategy::PrimaryWithFallback);
    }
}
