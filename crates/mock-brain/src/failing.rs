//! Failing brain implementation - every call fails.

use std::sync::atomic::{AtomicUsize, Ordering};

use brain_core::{async_trait, Brain, BrainError, Completion, GenerationRequest};

/// A brain whose every call fails, counting attempts.
#[derive(Debug)]
pub struct FailingBrain {
    status: Option<u16>,
    message: String,
    calls: AtomicUsize,
}

impl FailingBrain {
    /// Fail with `BrainError::Unavailable(message)`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail with `BrainError::Http { status, body }`.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(body)
        }
    }

    /// Number of `generate` calls.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Brain for FailingBrain {
    async fn generate(&self, _request: GenerationRequest) -> Result<Completion, BrainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(match self.status {
            Some(status) => BrainError::Http {
                status,
                body: self.message.clone(),
            },
            None => BrainError::Unavailable(self.message.clone()),
        })
    }

    fn name(&self) -> &str {
        "FailingBrain"
    }

    async fn is_ready(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_http_failure() {
        let brain = FailingBrain::http(500, "boom");
        let err = brain.generate(GenerationRequest::new("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "LLAMA HTTP error 500: boom");
        assert_eq!(brain.call_count(), 1);
        assert!(!brain.is_ready().await);
    }
}
