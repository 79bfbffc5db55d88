//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by the REST API.
//! The orchestrator is generic over its chat repository; AppState pins it
//! to the SQLite implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use parley_core::chat::service::ChatService;
use parley_core::orchestrator::{ChatOrchestrator, OrchestratorSettings};
use parley_core::prompt::smart::SmartPromptService;
use parley_core::search::box_provider::BoxSearchProvider;
use parley_core::tokens::TokenCounter;
use parley_infra::config::{database_url, resolve_api_key};
use parley_infra::llm::create_provider;
use parley_infra::search::HttpSearchProvider;
use parley_infra::sqlite::chat::SqliteChatRepository;
use parley_infra::sqlite::pool::DatabasePool;
use parley_infra::tokenizer::load_token_counter;
use parley_types::config::ParleyConfig;

/// Concrete type aliases for the generics pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteChatRepository>;

pub type ConcreteOrchestrator = ChatOrchestrator<SqliteChatRepository>;

/// Shared application state for the REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConcreteOrchestrator>,
    /// `None` when the utility model has no API key; smart prompt then
    /// returns drafts unchanged.
    pub smart_prompt: Option<Arc<SmartPromptService>>,
    pub token_counter: Arc<dyn TokenCounter>,
}

impl AppState {
    pub fn new(
        orchestrator: ConcreteOrchestrator,
        smart_prompt: Option<SmartPromptService>,
        token_counter: Arc<dyn TokenCounter>,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            smart_prompt: smart_prompt.map(Arc::new),
            token_counter,
        }
    }

    /// Connect to the database and build every provider from `config`.
    ///
    /// Fails when the chat model's API key is missing; the utility model and
    /// web search are optional.
    pub async fn init(config: &ParleyConfig, data_dir: &Path) -> anyhow::Result<Self> {
        let chats = open_chat_service(config, data_dir).await?;

        let chat_key = resolve_api_key(&config.chat.api_key_env);
        let provider = create_provider(&config.chat, chat_key).with_context(|| {
            format!(
                "chat model '{}' needs an API key in ${}",
                config.chat.name, config.chat.api_key_env
            )
        })?;
        info!(provider = provider.name(), model = provider.model(), "Chat model ready");

        let search = match resolve_api_key(&config.search.api_key_env) {
            Some(key) => {
                let name = HttpSearchProvider::name_for_endpoint(&config.search.base_url);
                let search = HttpSearchProvider::new(name, config.search.base_url.clone(), key)
                    .context("failed to build search client")?;
                Some(Arc::new(BoxSearchProvider::new(search)))
            }
            None => {
                warn!(
                    env = %config.search.api_key_env,
                    "No search API key set, web search turns will be declined"
                );
                None
            }
        };

        let token_counter = load_token_counter(config.tokenizer.path.as_deref());

        let utility_key = resolve_api_key(&config.utility.api_key_env);
        let smart_prompt = match create_provider(&config.utility, utility_key) {
            Ok(utility) => {
                info!(provider = utility.name(), model = utility.model(), "Utility model ready");
                Some(SmartPromptService::new(
                    Arc::new(utility),
                    token_counter.clone(),
                ))
            }
            Err(e) => {
                warn!(
                    error = %e,
                    env = %config.utility.api_key_env,
                    "Utility model unavailable, smart prompt will return drafts unchanged"
                );
                None
            }
        };

        let settings = OrchestratorSettings {
            history_limit: config.history.limit,
            search_results: config.search.max_results,
        };
        let orchestrator = ChatOrchestrator::new(chats, Arc::new(provider), search, settings);

        Ok(Self::new(orchestrator, smart_prompt, token_counter))
    }
}

/// Open the database and wrap it in a chat service.
///
/// Used directly by the read-only CLI commands, which need no model keys.
/// An unopenable database is a startup error; per-request fallbacks only
/// apply once the pool exists.
pub async fn open_chat_service(
    config: &ParleyConfig,
    data_dir: &Path,
) -> anyhow::Result<ConcreteChatService> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let db_url = with_create_mode(&database_url(config, data_dir));
    let pool = DatabasePool::new(&db_url)
        .await
        .with_context(|| format!("failed to open database {db_url}"))?;

    Ok(ChatService::new(SqliteChatRepository::new(pool)))
}

/// Append `mode=rwc` so SQLite creates the file on first run.
fn with_create_mode(url: &str) -> String {
    if url.contains("mode=") {
        url.to_string()
    } else if url.contains('?') {
        format!("{url}&mode=rwc")
    } else {
        format!("{url}?mode=rwc")
    }
}

/// Data directory and config loaded once at startup.
#[derive(Debug, Clone)]
pub struct Environment {
    pub data_dir: PathBuf,
    pub config: ParleyConfig,
}

impl Environment {
    pub async fn load() -> Self {
        let data_dir = parley_infra::config::resolve_data_dir();
        let config = parley_infra::config::load_config(&data_dir).await;
        Self { data_dir, config }
    }
}
