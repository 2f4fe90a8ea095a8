//! Prompt assembly for the plain-chat path.

use std::sync::Arc;

use brain_core::{hash_prompt, Role, Turn, UserFact};
use tracing::debug;

use crate::config::{DEFAULT_EXEMPLAR_LIMIT, DEFAULT_HISTORY_WINDOW};
use crate::persona::Persona;

/// Builds the ordered message list sent to the model.
///
/// Output order is fixed: system message, exemplar pairs, history pairs,
/// then the query as the last user turn.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    persona: Arc<Persona>,
    exemplar_limit: usize,
    history_window: usize,
}

impl PromptAssembler {
    /// Create an assembler with the default limits.
    pub fn new(persona: Arc<Persona>) -> Self {
        Self {
            persona,
            exemplar_limit: DEFAULT_EXEMPLAR_LIMIT,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    /// Set how many exemplar pairs are included.
    pub fn with_exemplar_limit(mut self, limit: usize) -> Self {
        self.exemplar_limit = limit;
        self
    }

    /// Set how many history pairs are included.
    pub fn with_history_window(mut self, pairs: usize) -> Self {
        self.history_window = pairs;
        self
    }

    /// Compose the system message.
    pub fn system_prompt(&self, facts: &[UserFact], include_identity: bool) -> String {
        let mut prompt = self.persona.identity_block();

        if include_identity {
            prompt.push_str("\n\n");
            prompt.push_str(&self.persona.disclosure_block());
        }

        prompt.push_str("\n\n");
        prompt.push_str(&self.persona.knowledge);

        if !facts.is_empty() {
            let lines = facts
                .iter()
                .map(UserFact::to_line)
                .collect::<Vec<_>>()
                .join("\n");
            prompt.push_str("\n\nمعلومات عن المستخدم:\n");
            prompt.push_str(&lines);
        }

        prompt
    }

    /// Build the message list for `query`.
    pub fn assemble(
        &self,
        query: &str,
        facts: &[UserFact],
        include_identity: bool,
        history: &[Turn],
    ) -> Vec<Turn> {
        let system = self.system_prompt(facts, include_identity);
        debug!(
            fingerprint = %hash_prompt(&system),
            facts = facts.len(),
            include_identity,
            "Assembled system prompt"
        );

        let exemplars = self.persona.exemplars.iter().take(self.exemplar_limit);
        let pairs = history_pairs(history, self.history_window);

        let mut messages = Vec::with_capacity(2 + 2 * (exemplars.len() + pairs.len()));
        messages.push(Turn::system(system));

        for exemplar in exemplars {
            messages.push(Turn::user(exemplar.user.clone()));
            messages.push(Turn::assistant(exemplar.assistant.clone()));
        }

        for (user, assistant) in pairs {
            messages.push(user.clone());
            messages.push(assistant.clone());
        }

        messages.push(Turn::user(query));
        messages
    }
}

/// The most recent `window` complete user/assistant pairs, oldest first.
///
/// System turns are dropped. A user turn not followed by an assistant turn
/// (or an assistant turn with no preceding user turn) is dropped, so roles
/// always alternate user then assistant.
pub fn history_pairs(history: &[Turn], window: usize) -> Vec<(&Turn, &Turn)> {
    let mut pairs = Vec::new();
    let mut pending_user: Option<&Turn> = None;

    for turn in history.iter().filter(|turn| turn.role.is_conversational()) {
        match turn.role {
            Role::User => pending_user = Some(turn),
            Role::Assistant => {
                if let Some(user) = pending_user.take() {
                    pairs.push((user, turn));
                }
            }
            Role::System => {}
        }
    }

    let skip = pairs.len().saturating_sub(window);
    pairs.into_iter().skip(skip).collect()
}
