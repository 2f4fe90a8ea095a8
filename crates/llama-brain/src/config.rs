//! Configuration for the model engines and the invoker.

use std::env;
use std::fmt;
use std::str::FromStr;

use brain_core::BrainError;

/// Default chat-completions API URL.
pub const DEFAULT_API_URL: &str = "https://api.openai.com";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default local Llama HTTP endpoint.
pub const DEFAULT_LOCAL_URL: &str = "http://localhost:8080/generate";

/// Which engines the invoker uses, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineStrategy {
    /// Try the chat-completions engine first, fall back to the local engine.
    #[default]
    PrimaryWithFallback,
    /// Only use the local engine.
    FallbackOnly,
}

impl FromStr for EngineStrategy {
    type Err = BrainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "primary" | "primary_with_fallback" => Ok(Self::PrimaryWithFallback),
            "fallback" | "fallback_only" | "local" => Ok(Self::FallbackOnly),
            other => Err(BrainError::Configuration(format!(
                "unknown LLM_ENGINE value: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for EngineStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryWithFallback => write!(f, "primary_with_fallback"),
            Self::FallbackOnly => write!(f, "fallback_only"),
        }
    }
}

/// Configuration for the model engines.
#[derive(Debug, Clone)]
pub struct LlamaBrainConfig {
    /// Engine selection.
    pub strategy: EngineStrategy,

    /// Chat-completions API URL (primary engine).
    pub api_url: String,

    /// API key for the primary engine. The primary is disabled without one.
    pub api_key: Option<String>,

    /// Model name for the primary engine.
    pub model: String,

    /// Local generate endpoint (secondary engine).
    pub local_url: String,

    /// Default temperature when a request does not set one.
    pub temperature: f32,

    /// Default max tokens when a request does not set one.
    pub max_tokens: u32,

    /// HTTP timeout for a single engine call, in seconds.
    pub timeout_secs: u64,
}

impl Default for LlamaBrainConfig {
    fn default() -> Self {
        Self {
            strategy: EngineStrategy::default(),
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            local_url: DEFAULT_LOCAL_URL.to_string(),
            temperature: 0.2,
            max_tokens: 512,
            timeout_secs: 60,
        }
    }
}

impl LlamaBrainConfig {
    /// Create configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `LLM_ENGINE` - `primary` (default) or `fallback`
    /// - `LLM_API_URL` - Chat-completions API URL (default: https://api.openai.com)
    /// - `LLM_API_KEY` - API key; without it the primary engine is disabled
    /// - `LLM_MODEL` - Model name (default: gpt-4o-mini)
    /// - `LLAMA_LOCAL_URL` - Local endpoint (default: http://localhost:8080/generate)
    /// - `LLM_TEMPERATURE` - Default temperature (default: 0.2)
    /// - `LLM_MAX_TOKENS` - Default max tokens (default: 512)
    /// - `LLM_TIMEOUT_SECS` - Per-call HTTP timeout (default: 60)
    pub fn from_env() -> Result<Self, BrainError> {
        let defaults = Self::default();

        let strategy = match env::var("LLM_ENGINE") {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => EngineStrategy::default(),
        };

        let api_key = env::var("LLM_API_KEY").ok().filter(|key| !key.is_empty());

        Ok(Self {
            strategy,
            api_url: env::var("LLM_API_URL").unwrap_or(defaults.api_url),
            api_key,
            model: env::var("LLM_MODEL").unwrap_or(defaults.model),
            local_url: env::var("LLAMA_LOCAL_URL").unwrap_or(defaults.local_url),
            temperature: env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.temperature),
            max_tokens: env::var("LLM_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_tokens),
            timeout_secs: env::var("LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        })
    }

    /// The strategy actually usable with this configuration.
    ///
    /// A primary strategy without an API key degrades to fallback-only.
    pub fn effective_strategy(&self) -> EngineStrategy {
        match (self.strategy, &self.api_key) {
            (EngineStrategy::PrimaryWithFallback, Some(_)) => EngineStrategy::PrimaryWithFallback,
            _ => EngineStrategy::FallbackOnly,
        }
    }

    /// Create a new config builder.
    pub fn builder() -> LlamaBrainConfigBuilder {
        LlamaBrainConfigBuilder::default()
    }
}

/// Builder for LlamaBrainConfig.
#[derive(Debug, Default)]
pub struct LlamaBrainConfigBuilder {
    config: LlamaBrainConfig,
}

impl LlamaBrainConfigBuilder {
    /// Set the engine strategy.
    pub fn strategy(mut self, strategy: EngineStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Set the primary API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the primary API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Set the primary model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the local endpoint URL.
    pub fn local_url(mut self, url: impl Into<String>) -> Self {
        self.config.local_url = url.into();
        self
    }

    /// Set the default temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the default max tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set the per-call HTTP timeout.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> LlamaBrainConfig {
        self.config
    }
}
