//! Chat and message types for Parley.
//!
//! A chat is an opaque identifier plus a creation timestamp; messages are
//! append-only and replayed in creation order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::depth::Depth;
use crate::llm::Usage;

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// Prefix for chat ids that exist only in memory because persistence failed.
pub const LOCAL_CHAT_PREFIX: &str = "local-";

/// A conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    /// A new chat with a time-sortable id.
    pub fn new() -> Self {
        Self::with_id(Uuid::now_v7().to_string())
    }

    /// A new chat under a caller-chosen id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
        }
    }
}

impl Default for Chat {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns true for ids handed out when the database was unavailable.
pub fn is_local_chat_id(id: &str) -> bool {
    id.starts_with(LOCAL_CHAT_PREFIX)
}

/// Build a fallback chat id that never touches the database.
pub fn local_chat_id() -> String {
    format!("{LOCAL_CHAT_PREFIX}{}", Uuid::now_v7())
}

/// A single message within a chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub chat_id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(chat_id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            chat_id: chat_id.into(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// One incoming user turn.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// Existing chat to continue; a new chat is allocated when absent.
    pub chat_id: Option<String>,
    pub message: String,
    pub depth: Depth,
    /// Route through the search-augmented branch.
    pub web_search: bool,
}

/// The orchestrator's answer to a [`ChatTurn`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub chat_id: String,
    pub response: String,
    pub usage: Usage,
}
