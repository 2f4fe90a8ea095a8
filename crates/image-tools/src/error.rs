//! Error types for image tool operations.

use thiserror::Error;

/// Errors that can occur while calling an image service.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Required credentials or settings are missing.
    #[error("{0}")]
    Configuration(String),

    /// The service answered with a non-success status or an unusable payload.
    #[error("{0}")]
    Service(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing a generated image failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The turn deadline elapsed before the service answered.
    #[error("image service timed out")]
    Timeout,
}

impl ToolError {
    /// Whether the error comes from missing configuration rather than the service.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ToolError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_is_verbatim() {
        let err = ToolError::Service("Stable Diffusion API error: 500 boom".to_string());
        assert_eq!(err.to_string(), "Stable Diffusion API error: 500 boom");
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_configuration_error() {
        let err = ToolError::Configuration("STABILITY_API_KEY not set in environment".to_string());
        assert!(err.is_configuration());
    }
}
