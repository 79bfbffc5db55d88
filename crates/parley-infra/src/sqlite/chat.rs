//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `parley-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, writes on the
//! single-connection writer and reads on the reader pool.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use uuid::Uuid;

use parley_core::chat::repository::ChatRepository;
use parley_types::chat::{Chat, ChatMessage, MessageRole};
use parley_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatRow {
    id: String,
    created_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_chat(self) -> Result<Chat, RepositoryError> {
        Ok(Chat {
            id: self.id,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

struct MessageRow {
    id: String,
    chat_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(ChatMessage {
            id,
            chat_id: self.chat_id,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width UTC timestamps so that text ordering matches time ordering.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_chat(&self, chat: &Chat) -> Result<Chat, RepositoryError> {
        let result = sqlx::query("INSERT INTO chats (id, created_at) VALUES (?, ?)")
            .bind(&chat.id)
            .bind(format_datetime(&chat.created_at))
            .execute(&self.pool.writer)
            .await;

        match result {
            Ok(_) => Ok(chat.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("chat '{}' already exists", chat.id)),
            ),
            Err(e) => Err(query_error(e)),
        }
    }

    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, RepositoryError> {
        let row = sqlx::query("SELECT id, created_at FROM chats WHERE id = ?")
            .bind(chat_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let chat_row = ChatRow::from_row(&row).map_err(query_error)?;
                Ok(Some(chat_row.into_chat()?))
            }
            None => Ok(None),
        }
    }

    async fn list_chats(&self, limit: Option<i64>) -> Result<Vec<Chat>, RepositoryError> {
        // A negative LIMIT means "no limit" in SQLite.
        let rows = sqlx::query(
            "SELECT id, created_at FROM chats ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut chats = Vec::with_capacity(rows.len());
        for row in &rows {
            let chat_row = ChatRow::from_row(row).map_err(query_error)?;
            chats.push(chat_row.into_chat()?);
        }

        Ok(chats)
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO messages (id, chat_id, role, content, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(&message.chat_id)
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn get_messages(
        &self,
        chat_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        // Take the newest `limit` rows, then flip them back to creation order.
        let rows = sqlx::query(
            r#"SELECT id, chat_id, role, content, created_at FROM (
                   SELECT rowid AS seq, id, chat_id, role, content, created_at
                   FROM messages
                   WHERE chat_id = ?
                   ORDER BY created_at DESC, rowid DESC
                   LIMIT ?
               )
               ORDER BY created_at ASC, seq ASC"#,
        )
        .bind(chat_id)
        .bind(limit.unwrap_or(-1))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = MessageRow::from_row(row).map_err(query_error)?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }

    async fn count_messages(&self, chat_id: &str) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let count: i64 = row.try_get("cnt").map_err(query_error)?;

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    /// The directory must outlive the pool; dropping it deletes the file.
    async fn test_pool() -> (tempfile::TempDir, DatabasePool) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (dir, pool)
    }

    #[tokio::test]
    async fn test_create_and_get_chat() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteChatRepository::new(pool);
        let chat = Chat::new();
        repo.create_chat(&chat).await.unwrap();

        let fetched = repo.get_chat(&chat.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, chat.id);
        assert_eq!(
            fetched.created_at.timestamp_micros(),
            chat.created_at.timestamp_micros()
        );

        assert!(repo.get_chat("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_chat_conflicts() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteChatRepository::new(pool);
        let chat = Chat::with_id("fixed-id");
        repo.create_chat(&chat).await.unwrap();

        let err = repo.create_chat(&chat).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_chats_newest_first() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteChatRepository::new(pool);
        let now = Utc::now();
        for (i, id) in ["a", "b", "c"].iter().enumerate() {
            let chat = Chat {
                id: id.to_string(),
                created_at: now + Duration::seconds(i as i64),
            };
            repo.create_chat(&chat).await.unwrap();
        }

        let ids: Vec<String> = repo
            .list_chats(None)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);

        let limited = repo.list_chats(Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id, "c");
    }

    #[tokio::test]
    async fn test_save_and_get_messages() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteChatRepository::new(pool);
        let chat = Chat::new();
        repo.create_chat(&chat).await.unwrap();

        repo.save_message(&ChatMessage::new(&chat.id, MessageRole::User, "Hello"))
            .await
            .unwrap();
        repo.save_message(&ChatMessage::new(&chat.id, MessageRole::Assistant, "Hi there!"))
            .await
            .unwrap();

        let messages = repo.get_messages(&chat.id, None).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "Hello");
        assert_eq!(messages[1].role, MessageRole::Assistant);

        assert_eq!(repo.count_messages(&chat.id).await.unwrap(), 2);
        assert_eq!(repo.count_messages("other").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_messages_limit_keeps_most_recent_in_order() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteChatRepository::new(pool);
        let chat = Chat::new();
        repo.create_chat(&chat).await.unwrap();

        // Identical timestamps: ordering must fall back to insertion order.
        let at = Utc::now();
        for (i, content) in ["one", "two", "three", "four"].iter().enumerate() {
            let role = if i % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            };
            let message = ChatMessage {
                created_at: at,
                ..ChatMessage::new(&chat.id, role, *content)
            };
            repo.save_message(&message).await.unwrap();
        }

        let recent = repo.get_messages(&chat.id, Some(3)).await.unwrap();
        let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["two", "three", "four"]);
    }

    #[tokio::test]
    async fn test_message_requires_existing_chat() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteChatRepository::new(pool);
        let orphan = ChatMessage::new("no-such-chat", MessageRole::User, "hi");
        assert!(repo.save_message(&orphan).await.is_err());
    }

    #[tokio::test]
    async fn test_system_role_is_rejected() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteChatRepository::new(pool);
        let chat = Chat::new();
        repo.create_chat(&chat).await.unwrap();

        let message = ChatMessage::new(&chat.id, MessageRole::System, "not stored");
        assert!(repo.save_message(&message).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_chat_cascades_messages() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteChatRepository::new(pool.clone());
        let chat = Chat::new();
        repo.create_chat(&chat).await.unwrap();
        repo.save_message(&ChatMessage::new(&chat.id, MessageRole::User, "bye"))
            .await
            .unwrap();

        sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(&chat.id)
            .execute(&pool.writer)
            .await
            .unwrap();

        assert_eq!(repo.count_messages(&chat.id).await.unwrap(), 0);
    }
}
