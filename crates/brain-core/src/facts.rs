//! User facts: durable, read-only knowledge about a user injected into prompts.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::StoreError;

/// A single fact known about a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFact {
    /// Kind of fact (e.g. "name", "city").
    pub fact_type: String,
    /// The fact itself.
    pub fact_value: String,
}

impl UserFact {
    /// Create a fact.
    pub fn new(fact_type: impl Into<String>, fact_value: impl Into<String>) -> Self {
        Self {
            fact_type: fact_type.into(),
            fact_value: fact_value.into(),
        }
    }

    /// Render the fact as a prompt line.
    pub fn to_line(&self) -> String {
        format!("- {}: {}", self.fact_type, self.fact_value)
    }
}

/// Read boundary to wherever user facts are persisted.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// All facts known for a user (empty when the user is unknown).
    async fn get_user_facts(&self, user_id: &str) -> Result<Vec<UserFact>, StoreError>;
}

/// Process-local fact store.
#[derive(Debug, Default)]
pub struct InMemoryFactStore {
    facts: RwLock<HashMap<String, Vec<UserFact>>>,
}

impl InMemoryFactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fact for a user.
    pub async fn add_fact(&self, user_id: &str, fact: UserFact) {
        let mut facts = self.facts.write().await;
        facts.entry(user_id.to_string()).or_default().push(fact);
    }

    /// Forget every fact for a user.
    pub async fn clear(&self, user_id: &str) {
        self.facts.write().await.remove(user_id);
    }
}

#[async_trait]
impl FactStore for InMemoryFactStore {
    async fn get_user_facts(&self, user_id: &str) -> Result<Vec<UserFact>, StoreError> {
        let facts = self.facts.read().await;
        Ok(facts.get(user_id).cloned().unwrap_or_default())
    }
}
