//! Conversation persistence boundary.
//!
//! The orchestrator only talks to [`ConversationStore`]; the in-memory
//! implementation keeps conversations in recency order and evicts the least
//! recently used ones once a configurable limit is reached.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::message::{Role, Turn};

/// Default maximum number of conversations to keep before LRU eviction.
const DEFAULT_MAX_CONVERSATIONS: usize = 10000;

/// Conversation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Store-assigned identifier.
    pub id: u64,
    /// Owner of the conversation.
    pub user_id: String,
    /// Short display title.
    pub title: String,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
    /// When a message was last appended.
    pub updated_at: DateTime<Utc>,
}

/// A persisted message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    /// Who produced the message.
    pub role: Role,
    /// Message content.
    pub content: String,
    /// Reasoning trace shown alongside deep-thinking answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_process: Option<String>,
    /// When the message was stored.
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    /// A user message stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// An assistant message stamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            thinking_process: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a reasoning trace.
    pub fn with_thinking(mut self, thinking: Option<String>) -> Self {
        self.thinking_process = thinking;
        self
    }

    /// The message as a model turn.
    pub fn to_turn(&self) -> Turn {
        Turn::new(self.role, self.content.clone())
    }
}

/// Read/write boundary to wherever conversations are persisted.
///
/// Every operation is scoped by `user_id`; touching someone else's
/// conversation behaves as if it did not exist.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create an empty conversation.
    async fn create_conversation(
        &self,
        user_id: &str,
        title: &str,
    ) -> Result<Conversation, StoreError>;

    /// Look up a conversation.
    async fn get_conversation(
        &self,
        user_id: &str,
        conversation_id: u64,
    ) -> Result<Conversation, StoreError>;

    /// All conversations of a user, most recently updated first.
    async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError>;

    /// Append a message to a conversation.
    async fn append_message(
        &self,
        user_id: &str,
        conversation_id: u64,
        message: StoredMessage,
    ) -> Result<(), StoreError>;

    /// Messages of a conversation in insertion order.
    async fn messages(
        &self,
        user_id: &str,
        conversation_id: u64,
    ) -> Result<Vec<StoredMessage>, StoreError>;

    /// Delete a conversation and its messages.
    async fn delete_conversation(
        &self,
        user_id: &str,
        conversation_id: u64,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
struct Entry {
    conversation: Conversation,
    messages: Vec<StoredMessage>,
}

/// Process-local conversation store with LRU eviction.
///
/// Conversations live in an `IndexMap` ordered from least to most recently
/// updated, so eviction drops index 0 and listing walks the map backwards.
#[derive(Debug)]
pub struct InMemoryConversationStore {
    conversations: RwLock<IndexMap<u64, Entry>>,
    next_id: AtomicU64,
    max_conversations: usize,
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryConversationStore {
    /// Create a store with the default conversation limit (10,000).
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_CONVERSATIONS)
    }

    /// Create a store that keeps at most `max_conversations` conversations.
    pub fn with_limit(max_conversations: usize) -> Self {
        Self {
            conversations: RwLock::new(IndexMap::new()),
            next_id: AtomicU64::new(1),
            max_conversations,
        }
    }

    /// Number of conversations currently held.
    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    /// Whether the store holds no conversations.
    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}

fn owned<'a>(
    entry: Option<&'a Entry>,
    user_id: &str,
    conversation_id: u64,
) -> Result<&'a Entry, StoreError> {
    entry
        .filter(|entry| entry.conversation.user_id == user_id)
        .ok_or(StoreError::ConversationNotFound(conversation_id))
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create_conversation(
        &self,
        user_id: &str,
        title: &str,
    ) -> Result<Conversation, StoreError> {
        let now = Utc::now();
        let conversation = Conversation {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            user_id: user_id.to_string(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };

        let mut conversations = self.conversations.write().await;
        conversations.insert(
            conversation.id,
            Entry {
                conversation: conversation.clone(),
                messages: Vec::new(),
            },
        );

        while conversations.len() > self.max_conversations {
            conversations.shift_remove_index(0);
        }

        Ok(conversation)
    }

    async fn get_conversation(
        &self,
        user_id: &str,
        conversation_id: u64,
    ) -> Result<Conversation, StoreError> {
        let conversations = self.conversations.read().await;
        owned(conversations.get(&conversation_id), user_id, conversation_id)
            .map(|entry| entry.conversation.clone())
    }

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError> {
        let conversations = self.conversations.read().await;
        Ok(conversations
            .values()
            .rev()
            .filter(|entry| entry.conversation.user_id == user_id)
            .map(|entry| entry.conversation.clone())
            .collect())
    }

    async fn append_message(
        &self,
        user_id: &str,
        conversation_id: u64,
        message: StoredMessage,
    ) -> Result<(), StoreError> {
        let mut conversations = self.conversations.write().await;
        owned(conversations.get(&conversation_id), user_id, conversation_id)?;

        // Re-insert at the end to mark as recently updated
        let mut entry = conversations
            .shift_remove(&conversation_id)
            .ok_or(StoreError::ConversationNotFound(conversation_id))?;
        entry.conversation.updated_at = message.created_at;
        entry.messages.push(message);
        conversations.insert(conversation_id, entry);

        Ok(())
    }

    async fn messages(
        &self,
        user_id: &str,
        conversation_id: u64,
    ) -> Result<Vec<StoredMessage>, StoreError> {
        let conversations = self.conversations.read().await;
        owned(conversations.get(&conversation_id), user_id, conversation_id)
            .map(|entry| entry.messages.clone())
    }

    async fn delete_conversation(
        &self,
        user_id: &str,
        conversation_id: u64,
    ) -> Result<(), StoreError> {
        let mut conversations = self.conversations.write().await;
        owned(conversations.get(&conversation_id), user_id, conversation_id)?;
        conversations.shift_remove(&conversation_id);
        Ok(())
    }
}
