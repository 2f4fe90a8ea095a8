//! The plain-chat engine.

use std::sync::Arc;

use brain_core::{Deadline, FactStore, GenerationOptions, Turn, UserFact};
use llama_brain::{ModelInvoker, ModelReply};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::OrchestratorError;
use crate::persona::Persona;
use crate::policy::CallSite;
use crate::prompt::PromptAssembler;
use crate::thinking::{DeepThinker, COMPOSE_FALLBACK};

/// Reply shown when the plain-chat path fails for any reason.
pub const TECHNICAL_APOLOGY: &str = "عذراً، حدث خطأ تقني. حاول مرة أخرى.";

/// Prefix of the reasoning trace shown with deep-thinking answers.
pub const THINKING_PREFIX: &str = "🧠 عملية التفكير العميق:\n\n";

/// A plain-chat answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    /// Text shown to the user.
    pub response: String,
    /// Reasoning trace, only in deep-thinking mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_process: Option<String>,
}

impl ChatReply {
    fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            thinking_process: None,
        }
    }
}

/// Answers text turns with persona, user facts and recent history.
#[derive(Clone)]
pub struct ChatEngine {
    invoker: ModelInvoker,
    assembler: PromptAssembler,
    thinker: DeepThinker,
    facts: Arc<dyn FactStore>,
    persona: Arc<Persona>,
}

impl ChatEngine {
    /// Create an engine.
    pub fn new(
        invoker: ModelInvoker,
        assembler: PromptAssembler,
        facts: Arc<dyn FactStore>,
        persona: Arc<Persona>,
    ) -> Self {
        Self {
            thinker: DeepThinker::new(invoker.clone()),
            invoker,
            assembler,
            facts,
            persona,
        }
    }

    /// Answer `query`.
    ///
    /// Every failure on this path is logged and replaced by
    /// [`TECHNICAL_APOLOGY`], reported as a normal reply.
    pub async fn respond(
        &self,
        user_id: Option<&str>,
        query: &str,
        history: &[Turn],
        use_deep_thinking: bool,
        deadline: Deadline,
    ) -> Result<ChatReply, OrchestratorError> {
        match self
            .try_respond(user_id, query, history, use_deep_thinking, deadline)
            .await
        {
            Ok(reply) => Ok(reply),
            Err(error) => CallSite::PlainChat
                .handle(&error)
                .or_mask(|| ChatReply::text(TECHNICAL_APOLOGY)),
        }
    }

    async fn try_respond(
        &self,
        user_id: Option<&str>,
        query: &str,
        history: &[Turn],
        use_deep_thinking: bool,
        deadline: Deadline,
    ) -> Result<ChatReply, String> {
        let include_identity = self.persona.asks_identity(query);

        let facts: Vec<UserFact> = match user_id {
            Some(user_id) => self
                .facts
                .get_user_facts(user_id)
                .await
                .map_err(|e| format!("fact lookup failed: {}", e))?,
            None => Vec::new(),
        };

        if use_deep_thinking {
            info!("Answering with deep thinking");
            let thought = self.thinker.think(query, deadline).await?;
            return Ok(ChatReply {
                response: thought.final_answer,
                thinking_process: Some(format!("{}{}", THINKING_PREFIX, thought.reasoning_trace)),
            });
        }

        let messages = self
            .assembler
            .assemble(query, &facts, include_identity, history);
        debug!(
            messages = messages.len(),
            facts = facts.len(),
            include_identity,
            "Invoking model for plain chat"
        );

        match self
            .invoker
            .invoke_until(messages, GenerationOptions::default(), deadline)
            .await
        {
            ModelReply::Text(text) => Ok(ChatReply::text(text)),
            ModelReply::Structured(_) => Ok(ChatReply::text(COMPOSE_FALLBACK)),
            ModelReply::Failed(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use brain_core::{InMemoryFactStore, StoreError};
    use mock_brain::{FailingBrain, ScriptedBrain};
    use serde_json::json;

    struct BrokenFacts;

    #[async_trait]
    impl FactStore for BrokenFacts {
        async fn get_user_facts(&self, _user_id: &str) -> Result<Vec<UserFact>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
    }

    fn engine(brain: Arc<dyn brain_core::Brain>, facts: Arc<dyn FactStore>) -> ChatEngine {
        let persona = Arc::new(Persona::default());
        ChatEngine::new(
            ModelInvoker::fallback_only(brain),
            PromptAssembler::new(persona.clone()),
            facts,
            persona,
        )
    }

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_plain_reply_uses_facts_and_history() {
        let brain = Arc::new(ScriptedBrain::with_replies(["أهلاً سارة"]));
        let facts = Arc::new(InMemoryFactStore::new());
        facts.add_fact("u1", UserFact::new("name", "Sara")).await;
        let engine = engine(brain.clone(), facts);

        let history = vec![Turn::user("hi"), Turn::assistant("hello")];
        let reply = engine
            .respond(Some("u1"), "من أنت؟", &history, false, deadline())
            .await
            .unwrap();

        assert_eq!(reply, ChatReply::text("أهلاً سارة"));

        let messages = brain.requests()[0].input.to_messages();
        assert_eq!(messages.len(), 1 + 10 + 2 + 1);
        assert!(messages[0].content.contains("- name: Sara"));
        assert!(messages[0].content.contains("- المطور: ليث النسر"));
        assert_eq!(messages[11], Turn::user("hi"));
    }

    #[tokio::test]
    async fn test_non_text_reply_uses_short_apology() {
        let brain = Arc::new(ScriptedBrain::new());
        brain.push_structured(json!({"weird": true}));
        let engine = engine(brain, Arc::new(InMemoryFactStore::new()));

        let reply = engine.respond(None, "x", &[], false, deadline()).await.unwrap();
        assert_eq!(reply.response, COMPOSE_FALLBACK);
    }

    #[tokio::test]
    async fn test_model_failure_is_masked() {
        let engine = engine(
            Arc::new(FailingBrain::http(500, "boom")),
            Arc::new(InMemoryFactStore::new()),
        );

        let reply = engine.respond(Some("u1"), "x", &[], false, deadline()).await.unwrap();
        assert_eq!(reply, ChatReply::text(TECHNICAL_APOLOGY));
    }

    #[tokio::test]
    async fn test_fact_failure_is_masked() {
        let brain = Arc::new(ScriptedBrain::with_replies(["never"]));
        let engine = engine(brain.clone(), Arc::new(BrokenFacts));

        let reply = engine.respond(Some("u1"), "x", &[], false, deadline()).await.unwrap();
        assert_eq!(reply.response, TECHNICAL_APOLOGY);
        assert_eq!(brain.call_count(), 0);
    }

    #[tokio::test]
    async fn test_deep_thinking_reply() {
        let brain = Arc::new(ScriptedBrain::with_replies(["تحليل", "الجواب"]));
        let engine = engine(brain.clone(), Arc::new(InMemoryFactStore::new()));

        let reply = engine
            .respond(Some("u1"), "سؤال", &[Turn::user("old")], true, deadline())
            .await
            .unwrap();

        assert_eq!(reply.response, "الجواب");
        assert_eq!(
            reply.thinking_process.as_deref(),
            Some("🧠 عملية التفكير العميق:\n\nتحليل")
        );
        assert_eq!(brain.call_count(), 2);
    }

    #[tokio::test]
    async fn test_deep_thinking_failure_is_masked() {
        let brain = Arc::new(FailingBrain::http(500, "boom"));
        let engine = engine(brain.clone(), Arc::new(InMemoryFactStore::new()));

        let reply = engine.respond(Some("u1"), "سؤال", &[], true, deadline()).await.unwrap();

        assert_eq!(reply, ChatReply::text(TECHNICAL_APOLOGY));
        assert_eq!(brain.call_count(), 1);
    }
}
