//! In-memory doubles for the core ports, shared by unit tests.

use std::sync::{Arc, Mutex};

use parley_types::chat::{Chat, ChatMessage};
use parley_types::error::RepositoryError;
use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};
use parley_types::search::SearchError;

use crate::chat::repository::ChatRepository;
use crate::llm::provider::LlmProvider;
use crate::search::provider::SearchProvider;

#[derive(Clone)]
enum Script {
    Reply(String),
    Fail,
}

/// LLM provider with a fixed reply that records every request it sees.
///
/// Clones share state, so a test can keep one handle and box the other.
#[derive(Clone)]
pub(crate) struct ScriptedProvider {
    script: Script,
    usage: Usage,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub(crate) fn replying(text: &str) -> Self {
        Self {
            script: Script::Reply(text.to_string()),
            usage: Usage::new(10, 5),
            requests: Arc::default(),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            script: Script::Fail,
            usage: Usage::default(),
            requests: Arc::default(),
        }
    }

    pub(crate) fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.script {
            Script::Reply(text) => Ok(CompletionResponse {
                id: "scripted-1".to_string(),
                content: text.clone(),
                model: "scripted-model".to_string(),
                stop_reason: StopReason::EndTurn,
                usage: self.usage,
            }),
            Script::Fail => Err(LlmError::Provider {
                message: "scripted failure".to_string(),
            }),
        }
    }
}

#[derive(Default)]
struct Store {
    chats: Vec<Chat>,
    messages: Vec<ChatMessage>,
}

/// Vec-backed chat repository.
#[derive(Default, Clone)]
pub(crate) struct InMemoryChatRepository {
    store: Arc<Mutex<Store>>,
}

impl ChatRepository for InMemoryChatRepository {
    async fn create_chat(&self, chat: &Chat) -> Result<Chat, RepositoryError> {
        let mut store = self.store.lock().unwrap();
        if store.chats.iter().any(|c| c.id == chat.id) {
            return Err(RepositoryError::Conflict(chat.id.clone()));
        }
        store.chats.push(chat.clone());
        Ok(chat.clone())
    }

    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, RepositoryError> {
        let store = self.store.lock().unwrap();
        Ok(store.chats.iter().find(|c| c.id == chat_id).cloned())
    }

    async fn list_chats(&self, limit: Option<i64>) -> Result<Vec<Chat>, RepositoryError> {
        let store = self.store.lock().unwrap();
        let limit = limit.map_or(usize::MAX, |l| l.max(0) as usize);
        Ok(store.chats.iter().rev().take(limit).cloned().collect())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().unwrap();
        if !store.chats.iter().any(|c| c.id == message.chat_id) {
            return Err(RepositoryError::NotFound);
        }
        store.messages.push(message.clone());
        Ok(())
    }

    async fn get_messages(
        &self,
        chat_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let store = self.store.lock().unwrap();
        let all: Vec<ChatMessage> = store
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        let skip = match limit {
            Some(l) => all.len().saturating_sub(l.max(0) as usize),
            None => 0,
        };
        Ok(all.into_iter().skip(skip).collect())
    }

    async fn count_messages(&self, chat_id: &str) -> Result<u64, RepositoryError> {
        let store = self.store.lock().unwrap();
        Ok(store.messages.iter().filter(|m| m.chat_id == chat_id).count() as u64)
    }
}

/// Repository whose every call fails, standing in for an unreachable database.
pub(crate) struct FailingChatRepository;

impl ChatRepository for FailingChatRepository {
    async fn create_chat(&self, _chat: &Chat) -> Result<Chat, RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn get_chat(&self, _chat_id: &str) -> Result<Option<Chat>, RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn list_chats(&self, _limit: Option<i64>) -> Result<Vec<Chat>, RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn save_message(&self, _message: &ChatMessage) -> Result<(), RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn get_messages(
        &self,
        _chat_id: &str,
        _limit: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        Err(RepositoryError::Connection)
    }

    async fn count_messages(&self, _chat_id: &str) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Connection)
    }
}

/// Search provider returning a canned body.
pub(crate) struct StaticSearch {
    body: serde_json::Value,
}

impl StaticSearch {
    pub(crate) fn new(body: serde_json::Value) -> Self {
        Self { body }
    }
}

impl SearchProvider for StaticSearch {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(
        &self,
        _query: &str,
        _max_results: usize,
    ) -> Result<serde_json::Value, SearchError> {
        Ok(self.body.clone())
    }
}

/// Search provider that always fails.
pub(crate) struct FailingSearch;

impl SearchProvider for FailingSearch {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(
        &self,
        _query: &str,
        _max_results: usize,
    ) -> Result<serde_json::Value, SearchError> {
        Err(SearchError::Status {
            status: 500,
            body: "upstream error".to_string(),
        })
    }
}
