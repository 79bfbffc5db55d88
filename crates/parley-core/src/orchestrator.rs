//! Chat orchestration: one user turn in, one assistant reply out.
//!
//! A turn resolves its chat, takes one of two branches (a direct completion
//! over the replayed history, or a web search followed by a synthesis
//! completion), persists both sides of the exchange and returns the reply
//! with normalized token usage.
//!
//! Nothing here returns an error. Model and search failures become an
//! apologetic reply with zero usage; persistence failures are absorbed by
//! [`ChatService`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use parley_types::chat::{ChatReply, ChatTurn, MessageRole};
use parley_types::depth::Depth;
use parley_types::llm::{CompletionRequest, LlmError, Usage};

use crate::chat::repository::ChatRepository;
use crate::chat::service::ChatService;
use crate::llm::box_provider::BoxLlmProvider;
use crate::prompt::assembly::{build_direct_request, build_search_request, format_sources_section};
use crate::search::box_provider::BoxSearchProvider;
use crate::search::extract::{extract_answer, extract_sources};

const REPLY_EMPTY: &str =
    "Sorry, the model returned an empty response. Please try rephrasing your message.";
const REPLY_PROVIDER_FAILED: &str =
    "Sorry, I couldn't get a response from the model right now. Please try again in a moment.";
const REPLY_RATE_LIMITED: &str =
    "Sorry, the model is receiving too many requests right now. Please wait a moment and try again.";
const REPLY_AUTH_FAILED: &str =
    "Sorry, the model provider rejected the server's credentials. Please contact the administrator.";
const REPLY_SEARCH_UNAVAILABLE: &str =
    "Sorry, web search is not configured on this server. Turn off web search to get a direct answer.";
const REPLY_SEARCH_FAILED: &str =
    "Sorry, the web search failed. Please try again, or turn off web search to get a direct answer.";

/// Tunables for [`ChatOrchestrator`].
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorSettings {
    /// Stored messages replayed into a direct completion.
    pub history_limit: i64,
    /// Search hits requested and cited per web search turn.
    pub search_results: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            history_limit: 20,
            search_results: 5,
        }
    }
}

/// Text and usage produced by one branch.
struct Outcome {
    text: String,
    usage: Usage,
    /// False when `text` is an apology rather than model output.
    answered: bool,
}

impl Outcome {
    fn apology(text: &str) -> Self {
        Self {
            text: text.to_string(),
            usage: Usage::default(),
            answered: false,
        }
    }
}

/// Routes user turns to the direct or search-augmented branch.
pub struct ChatOrchestrator<C: ChatRepository> {
    chats: ChatService<C>,
    provider: Arc<BoxLlmProvider>,
    search: Option<Arc<BoxSearchProvider>>,
    settings: OrchestratorSettings,
}

impl<C: ChatRepository> ChatOrchestrator<C> {
    pub fn new(
        chats: ChatService<C>,
        provider: Arc<BoxLlmProvider>,
        search: Option<Arc<BoxSearchProvider>>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            chats,
            provider,
            search,
            settings,
        }
    }

    /// The chat service, for read-only endpoints.
    pub fn chats(&self) -> &ChatService<C> {
        &self.chats
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }

    /// Handle one user turn.
    #[tracing::instrument(
        name = "chat.turn",
        skip_all,
        fields(depth = %turn.depth, web_search = turn.web_search, chat_id = tracing::field::Empty)
    )]
    pub async fn handle(&self, turn: ChatTurn) -> ChatReply {
        let chat_id = self.chats.resolve_chat(turn.chat_id.as_deref()).await;
        tracing::Span::current().record("chat_id", chat_id.as_str());

        // History is read before the new message is stored so it is not
        // replayed twice.
        let history = if turn.web_search {
            Vec::new()
        } else {
            self.chats
                .history(&chat_id, Some(self.settings.history_limit))
                .await
        };

        self.chats
            .record(&chat_id, MessageRole::User, &turn.message)
            .await;

        let outcome = if turn.web_search {
            self.search_branch(&turn.message, turn.depth).await
        } else {
            let request = build_direct_request(&history, &turn.message, turn.depth, "");
            debug!(history = history.len(), "Direct completion");
            self.complete(&request).await
        };

        self.chats
            .record(&chat_id, MessageRole::Assistant, &outcome.text)
            .await;

        info!(
            prompt_tokens = outcome.usage.prompt_tokens,
            completion_tokens = outcome.usage.completion_tokens,
            "Turn complete"
        );

        ChatReply {
            chat_id,
            response: outcome.text,
            usage: outcome.usage,
        }
    }

    async fn search_branch(&self, message: &str, depth: Depth) -> Outcome {
        let Some(search) = &self.search else {
            warn!("Web search requested but no search provider is configured");
            return Outcome::apology(REPLY_SEARCH_UNAVAILABLE);
        };

        let limit = self.settings.search_results;
        let body = match search.search(message, limit).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, provider = search.name(), "Web search failed");
                return Outcome::apology(REPLY_SEARCH_FAILED);
            }
        };

        let sources = extract_sources(&body, limit);
        let answer = extract_answer(&body);
        debug!(
            sources = sources.len(),
            has_answer = answer.is_some(),
            "Search results extracted"
        );

        let request = build_search_request(message, &sources, answer.as_deref(), depth, "");
        let mut outcome = self.complete(&request).await;
        if outcome.answered {
            outcome.text.push_str(&format_sources_section(&sources));
        }
        outcome
    }

    async fn complete(&self, request: &CompletionRequest) -> Outcome {
        match self.provider.complete(request).await {
            Ok(response) if response.content.trim().is_empty() => {
                warn!(provider = self.provider.name(), "Model returned an empty response");
                Outcome {
                    text: REPLY_EMPTY.to_string(),
                    usage: response.usage,
                    answered: false,
                }
            }
            Ok(response) => Outcome {
                text: response.content.trim().to_string(),
                usage: response.usage,
                answered: true,
            },
            Err(e) => {
                warn!(error = %e, provider = self.provider.name(), "Completion failed");
                Outcome::apology(apology_for(&e))
            }
        }
    }
}

/// User-facing text for a provider failure.
fn apology_for(error: &LlmError) -> &'static str {
    match error {
        LlmError::RateLimited { .. } | LlmError::Overloaded(_) => REPLY_RATE_LIMITED,
        LlmError::AuthenticationFailed => REPLY_AUTH_FAILED,
        _ => REPLY_PROVIDER_FAILED,
    }
}
