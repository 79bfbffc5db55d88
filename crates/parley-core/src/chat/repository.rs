//! ChatRepository trait definition.
//!
//! Provides persistence for chats and their append-only message history.

use parley_types::chat::{Chat, ChatMessage};
use parley_types::error::RepositoryError;

/// Repository trait for chat and message persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// Create a new chat. Returns the stored chat.
    fn create_chat(
        &self,
        chat: &Chat,
    ) -> impl std::future::Future<Output = Result<Chat, RepositoryError>> + Send;

    /// Get a chat by its id.
    fn get_chat(
        &self,
        chat_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// List chats, newest first.
    fn list_chats(
        &self,
        limit: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, RepositoryError>> + Send;

    /// Append a message to its chat.
    fn save_message(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get messages for a chat in creation order.
    ///
    /// With a `limit`, only the most recent `limit` messages are returned,
    /// still oldest first.
    fn get_messages(
        &self,
        chat_id: &str,
        limit: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Number of messages stored for a chat.
    fn count_messages(
        &self,
        chat_id: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
