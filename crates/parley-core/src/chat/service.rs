//! Chat service managing chat identity and message history.
//!
//! Persistence is best-effort: repository failures are logged and the
//! service degrades to a local chat id, an empty history, or a skipped
//! write. No repository error ever reaches the caller.

use tracing::{debug, info, warn};

use parley_types::chat::{Chat, ChatMessage, MessageRole, is_local_chat_id, local_chat_id};

use crate::chat::repository::ChatRepository;

/// Chat identity and history on top of a [`ChatRepository`].
pub struct ChatService<C: ChatRepository> {
    chat_repo: C,
}

impl<C: ChatRepository> ChatService<C> {
    pub fn new(chat_repo: C) -> Self {
        Self { chat_repo }
    }

    /// Access the chat repository.
    pub fn chat_repo(&self) -> &C {
        &self.chat_repo
    }

    /// Resolve the chat a turn belongs to.
    ///
    /// - absent or blank id: allocate and persist a new chat
    /// - known id: reuse it
    /// - unknown id: create a chat under that id
    ///
    /// When the repository fails, the supplied id is kept as-is, or a
    /// `local-` id is allocated if none was supplied.
    pub async fn resolve_chat(&self, requested: Option<&str>) -> String {
        let requested = requested.map(str::trim).filter(|id| !id.is_empty());

        let Some(id) = requested else {
            let chat = Chat::new();
            return match self.chat_repo.create_chat(&chat).await {
                Ok(created) => {
                    info!(chat_id = %created.id, "Chat created");
                    created.id
                }
                Err(e) => {
                    let fallback = local_chat_id();
                    warn!(error = %e, chat_id = %fallback, "Failed to create chat, using local id");
                    fallback
                }
            };
        };

        if is_local_chat_id(id) {
            return id.to_string();
        }

        match self.chat_repo.get_chat(id).await {
            Ok(Some(chat)) => chat.id,
            Ok(None) => match self.chat_repo.create_chat(&Chat::with_id(id)).await {
                Ok(created) => {
                    info!(chat_id = %created.id, "Chat created for client-supplied id");
                    created.id
                }
                Err(e) => {
                    warn!(error = %e, chat_id = %id, "Failed to create chat for supplied id");
                    id.to_string()
                }
            },
            Err(e) => {
                warn!(error = %e, chat_id = %id, "Failed to look up chat");
                id.to_string()
            }
        }
    }

    /// The most recent `limit` messages of a chat, oldest first.
    pub async fn history(&self, chat_id: &str, limit: Option<i64>) -> Vec<ChatMessage> {
        if is_local_chat_id(chat_id) {
            return Vec::new();
        }

        match self.chat_repo.get_messages(chat_id, limit).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(error = %e, chat_id = %chat_id, "Failed to load history, continuing without it");
                Vec::new()
            }
        }
    }

    /// Append a message to a chat.
    ///
    /// Returns the stored message, or `None` when the chat is local-only or
    /// the write failed.
    pub async fn record(
        &self,
        chat_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Option<ChatMessage> {
        if is_local_chat_id(chat_id) {
            debug!(chat_id = %chat_id, "Skipping persistence for local chat");
            return None;
        }

        let message = ChatMessage::new(chat_id, role, content);
        match self.chat_repo.save_message(&message).await {
            Ok(()) => Some(message),
            Err(e) => {
                warn!(error = %e, chat_id = %chat_id, role = %role, "Failed to save message");
                None
            }
        }
    }

    /// Chats newest first; empty when the repository fails.
    pub async fn list_chats(&self, limit: Option<i64>) -> Vec<Chat> {
        match self.chat_repo.list_chats(limit).await {
            Ok(chats) => chats,
            Err(e) => {
                warn!(error = %e, "Failed to list chats");
                Vec::new()
            }
        }
    }
}
