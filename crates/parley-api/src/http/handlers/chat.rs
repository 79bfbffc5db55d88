//! Chat HTTP handlers.
//!
//! Endpoints:
//! - POST /chat       - Send a message, optionally through web search
//! - GET  /chat/{id}  - Messages of one chat in creation order
//! - GET  /chats      - Chats newest first

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parley_types::chat::{Chat, ChatMessage, ChatReply, ChatTurn, MessageRole};
use parley_types::depth::Depth;

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for POST /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub chat_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub depth: Option<Depth>,
    #[serde(default, rename = "webSearch")]
    pub web_search: Option<bool>,
}

/// Query parameters for chat listing.
#[derive(Debug, Deserialize)]
pub struct ChatListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// A stored message as returned to the client.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for MessageBody {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            role: message.role,
            content: message.content,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageBody>,
}

#[derive(Debug, Serialize)]
pub struct ChatsResponse {
    pub chats: Vec<Chat>,
}

/// POST /chat - Run one turn and return the reply with token usage.
///
/// Model and search failures come back as a normal reply whose text is an
/// apology; only an empty message is rejected.
pub async fn post_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(request) = payload?;

    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let turn = ChatTurn {
        chat_id: request.chat_id,
        message: request.message,
        depth: request.depth.unwrap_or_default(),
        web_search: request.web_search.unwrap_or(false),
    };

    Ok(Json(state.orchestrator.handle(turn).await))
}

/// GET /chat/{id} - Full history; unknown or local chats yield no messages.
pub async fn get_chat_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Json<MessagesResponse> {
    let messages = state.orchestrator.chats().history(&chat_id, None).await;

    Json(MessagesResponse {
        messages: messages.into_iter().map(MessageBody::from).collect(),
    })
}

/// GET /chats - Chats newest first, at most `limit`.
pub async fn list_chats(
    State(state): State<AppState>,
    Query(query): Query<ChatListQuery>,
) -> Result<Json<ChatsResponse>, AppError> {
    if query.limit < 1 {
        return Err(AppError::Validation("limit must be at least 1".to_string()));
    }

    let chats = state.orchestrator.chats().list_chats(Some(query.limit)).await;
    Ok(Json(ChatsResponse { chats }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_defaults() {
        let request: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert!(request.chat_id.is_none());
        assert!(request.depth.is_none());
        assert!(request.web_search.is_none());

        let request: ChatRequest = serde_json::from_str(
            r#"{"chat_id": null, "message": "hi", "depth": null, "webSearch": null}"#,
        )
        .unwrap();
        assert!(request.chat_id.is_none());
        assert!(request.depth.is_none());
        assert!(request.web_search.is_none());
    }

    #[test]
    fn test_chat_request_camel_case_web_search() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"chat_id": "c1", "message": "hi", "depth": "Concise", "webSearch": true}"#,
        )
        .unwrap();
        assert_eq!(request.chat_id.as_deref(), Some("c1"));
        assert_eq!(request.depth, Some(Depth::Concise));
        assert_eq!(request.web_search, Some(true));
    }

    #[test]
    fn test_message_body_omits_chat_id() {
        let body = MessageBody::from(ChatMessage::new("c1", MessageRole::User, "hello"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hello");
        assert!(json.get("chat_id").is_none());
        assert!(json.get("created_at").is_some());
    }
}
