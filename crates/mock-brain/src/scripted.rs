//! Scripted brain implementation - replays queued replies.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use brain_core::{async_trait, Brain, BrainError, Completion, GenerationRequest};
use serde_json::Value;

/// A brain that answers from a queue of scripted replies.
///
/// Every request is recorded so tests can assert on prompts. Once the queue
/// is drained the brain fails with `BrainError::Unavailable`.
#[derive(Debug, Default)]
pub struct ScriptedBrain {
    replies: Mutex<VecDeque<Result<Completion, BrainError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    calls: AtomicUsize,
}

impl ScriptedBrain {
    /// Create a brain with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a brain that answers with the given texts in order.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let brain = Self::new();
        for reply in replies {
            brain.push_text(reply);
        }
        brain
    }

    /// Queue a text reply.
    pub fn push_text(&self, text: impl Into<String>) -> &Self {
        self.push(Ok(Completion::text(text)))
    }

    /// Queue a structured (non-text) reply.
    pub fn push_structured(&self, value: Value) -> &Self {
        self.push(Ok(Completion::Structured(value)))
    }

    /// Queue a failure.
    pub fn push_error(&self, error: BrainError) -> &Self {
        self.push(Err(error))
    }

    fn push(&self, reply: Result<Completion, BrainError>) -> &Self {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of `generate` calls.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Brain for ScriptedBrain {
    async fn generate(&self, request: GenerationRequest) -> Result<Completion, BrainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(BrainError::Unavailable("script exhausted".to_string())))
    }

    fn name(&self) -> &str {
        "ScriptedBrain"
    }
}
