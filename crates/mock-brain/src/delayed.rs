//! A brain that answers late.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use brain_core::{async_trait, Brain, BrainError, Completion, GenerationRequest};

/// Sleeps before forwarding to `inner`.
///
/// [`DelayedBrain::completed`] counts calls that ran to the end, so a test
/// can tell a call cut off by a deadline from one that finished.
#[derive(Debug)]
pub struct DelayedBrain<B: Brain> {
    inner: B,
    delay: Duration,
    completed: AtomicUsize,
}

impl<B: Brain> DelayedBrain<B> {
    /// Wrap `inner`, answering after `delay`.
    pub fn new(inner: B, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            completed: AtomicUsize::new(0),
        }
    }

    /// Wrap `inner` with a delay in milliseconds.
    pub fn with_millis(inner: B, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// Wrap `inner` with a delay in seconds.
    pub fn with_secs(inner: B, secs: u64) -> Self {
        Self::new(inner, Duration::from_secs(secs))
    }

    /// Calls that outlived the delay and reached `inner`.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<B: Brain> Brain for DelayedBrain<B> {
    async fn generate(&self, request: GenerationRequest) -> Result<Completion, BrainError> {
        tokio::time::sleep(self.delay).await;
        let result = self.inner.generate(request).await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }

    fn name(&self) -> &str {
        "DelayedBrain"
    }

    async fn is_ready(&self) -> bool {
        self.inner.is_ready().await
    }
}
