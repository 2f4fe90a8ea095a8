//! Two-phase deep thinking: reflect on the question, then compose an answer.

use brain_core::{Deadline, GenerationOptions};
use llama_brain::{ModelInvoker, ModelReply};
use serde::Serialize;
use tracing::debug;

/// Trace used when the reflect phase produced no text.
pub const REFLECT_PLACEHOLDER: &str = "جاري التفكير...";

/// Answer used when the compose phase produced no text.
pub const COMPOSE_FALLBACK: &str = "عذراً، حدث خطأ.";

/// Output of a successful pipeline run. Both fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thought {
    /// What the model reasoned in phase one.
    pub reasoning_trace: String,
    /// The answer built from that reasoning.
    pub final_answer: String,
}

/// Runs the reflect and compose phases sequentially.
#[derive(Debug, Clone)]
pub struct DeepThinker {
    invoker: ModelInvoker,
}

impl DeepThinker {
    /// Create a pipeline over `invoker`.
    pub fn new(invoker: ModelInvoker) -> Self {
        Self { invoker }
    }

    /// Reflect on `query`, then answer it using that reflection.
    ///
    /// A phase whose engines all failed ends the pipeline with that phase's
    /// error; the compose phase is not attempted after a failed reflection.
    pub async fn think(&self, query: &str, deadline: Deadline) -> Result<Thought, String> {
        let reflection = self
            .invoker
            .invoke_until(reflect_prompt(query), GenerationOptions::default(), deadline)
            .await;
        let reasoning_trace = text_or(reflection, REFLECT_PLACEHOLDER, "reflect")?;

        debug!(trace_len = reasoning_trace.len(), "Reflect phase finished");

        let answer = self
            .invoker
            .invoke_until(
                compose_prompt(&reasoning_trace, query),
                GenerationOptions::default(),
                deadline,
            )
            .await;
        let final_answer = text_or(answer, COMPOSE_FALLBACK, "compose")?;

        Ok(Thought {
            reasoning_trace,
            final_answer,
        })
    }
}

fn text_or(reply: ModelReply, substitute: &str, phase: &str) -> Result<String, String> {
    match reply {
        ModelReply::Text(text) if !text.trim().is_empty() => Ok(text),
        ModelReply::Failed(error) => {
            debug!(phase, "Deep thinking phase failed");
            Err(error)
        }
        _ => Ok(substitute.to_string()),
    }
}

/// Phase one: break the question down.
pub fn reflect_prompt(query: &str) -> String {
    format!(
        "أنت SevenAI في وضع التفكير العميق.\n\nقم بتحليل هذا السؤال خطوة بخطوة:\n\"{}\"\n\nفكر بصوت عالٍ:\n1. ما هو السؤال الحقيقي؟\n2. ما المعلومات المطلوبة؟\n3. كيف أبني إجابة شاملة؟\n\nاكتب تفكيرك بالتفصيل.",
        query
    )
}

/// Phase two: answer using the reflection verbatim.
pub fn compose_prompt(reflection: &str, query: &str) -> String {
    format!(
        "بناءً على هذا التفكير:\n{}\n\nالآن أجب على السؤال بشكل شامل ومفصل:\n\"{}\"",
        reflection, query
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use mock_brain::{FailingBrain, ScriptedBrain};
    use serde_json::json;

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_compose_embeds_reflection() {
        let brain = Arc::new(ScriptedBrain::with_replies(["step one", "final"]));
        let thinker = DeepThinker::new(ModelInvoker::fallback_only(brain.clone()));

        let thought = thinker.think("لماذا السماء زرقاء؟", deadline()).await.unwrap();

        assert_eq!(thought.reasoning_trace, "step one");
        assert_eq!(thought.final_answer, "final");

        let requests = brain.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].input.to_prompt().contains("\"لماذا السماء زرقاء؟\""));
        assert_eq!(
            requests[1].input.to_prompt(),
            compose_prompt("step one", "لماذا السماء زرقاء؟")
        );
    }

    #[tokio::test]
    async fn test_non_text_reflection_uses_placeholder() {
        let brain = Arc::new(ScriptedBrain::new());
        brain.push_structured(json!({"tokens": []}));
        brain.push_text("answer");
        let thinker = DeepThinker::new(ModelInvoker::fallback_only(brain.clone()));

        let thought = thinker.think("q", deadline()).await.unwrap();

        assert_eq!(thought.reasoning_trace, REFLECT_PLACEHOLDER);
        assert_eq!(thought.final_answer, "answer");
        assert!(brain.requests()[1]
            .input
            .to_prompt()
            .contains(REFLECT_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_empty_answer_uses_fallback_text() {
        let brain = Arc::new(ScriptedBrain::with_replies(["trace", "   "]));
        let thinker = DeepThinker::new(ModelInvoker::fallback_only(brain));

        let thought = thinker.think("q", deadline()).await.unwrap();

        assert_eq!(thought.reasoning_trace, "trace");
        assert_eq!(thought.final_answer, COMPOSE_FALLBACK);
    }

    #[tokio::test]
    async fn test_failed_reflection_stops_the_pipeline() {
        let brain = Arc::new(FailingBrain::http(503, "down"));
        let thinker = DeepThinker::new(ModelInvoker::fallback_only(brain.clone()));

        let error = thinker.think("q", deadline()).await.unwrap_err();

        assert!(error.contains("503"));
        assert_eq!(brain.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_compose_is_reported() {
        let brain = Arc::new(ScriptedBrain::with_replies(["trace"]));
        let thinker = DeepThinker::new(ModelInvoker::fallback_only(brain));

        let error = thinker.think("q", deadline()).await.unwrap_err();

        assert!(error.contains("script exhausted"));
    }
}
