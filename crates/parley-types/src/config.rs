//! Configuration types for Parley.
//!
//! `ParleyConfig` represents the top-level `config.toml`. Every section has
//! defaults so an empty or missing file yields a working configuration once
//! the API key environment variables are set.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::llm::{ProviderConfig, ProviderType};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    /// Model used for chat completions and search synthesis.
    #[serde(default = "default_chat_provider")]
    pub chat: ProviderConfig,

    /// Secondary model used for smart prompt optimization.
    #[serde(default = "default_utility_provider")]
    pub utility: ProviderConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub tokenizer: TokenizerConfig,
}

impl Default for ParleyConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            chat: default_chat_provider(),
            utility: default_utility_provider(),
            search: SearchConfig::default(),
            history: HistoryConfig::default(),
            tokenizer: TokenizerConfig::default(),
        }
    }
}

fn default_chat_provider() -> ProviderConfig {
    ProviderConfig {
        name: "groq".to_string(),
        provider_type: ProviderType::OpenAiCompatible,
        base_url: Some("https://api.groq.com/openai/v1".to_string()),
        model: "llama-3.3-70b-versatile".to_string(),
        api_key_env: "GROQ_API_KEY".to_string(),
        temperature: Some(0.7),
    }
}

fn default_utility_provider() -> ProviderConfig {
    ProviderConfig {
        name: "anthropic".to_string(),
        provider_type: ProviderType::Anthropic,
        base_url: None,
        model: "claude-3-5-haiku-latest".to_string(),
        api_key_env: "ANTHROPIC_API_KEY".to_string(),
        temperature: Some(0.2),
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database location. `None` means `{data_dir}/parley.db`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
}

/// External search API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_url")]
    pub base_url: String,
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_search_url() -> String {
    "https://api.tavily.com/search".to_string()
}

fn default_search_key_env() -> String {
    "TAVILY_API_KEY".to_string()
}

fn default_max_results() -> usize {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_url(),
            api_key_env: default_search_key_env(),
            max_results: default_max_results(),
        }
    }
}

/// How much stored history is replayed into each completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    20
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: default_history_limit(),
        }
    }
}

/// Optional Hugging Face `tokenizer.json` used for smart prompt token counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenizerConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = ParleyConfig::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.chat.provider_type, ProviderType::OpenAiCompatible);
        assert_eq!(config.utility.provider_type, ProviderType::Anthropic);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.history.limit, 20);
        assert!(config.tokenizer.path.is_none());
    }

    #[test]
    fn test_config_deserialize_empty_uses_defaults() {
        let config: ParleyConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.chat.api_key_env, "GROQ_API_KEY");
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_config_deserialize_with_values() {
        let toml_str = r#"
[server]
port = 8080

[chat]
name = "openai"
provider_type = "openai_compatible"
base_url = "https://api.openai.com/v1"
model = "gpt-4o-mini"
api_key_env = "OPENAI_API_KEY"

[search]
max_results = 3

[history]
limit = 6

[tokenizer]
path = "/opt/tokenizer.json"
"#;
        let config: ParleyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.chat.name, "openai");
        assert_eq!(config.chat.model, "gpt-4o-mini");
        assert!(config.chat.temperature.is_none());
        assert_eq!(config.utility.name, "anthropic");
        assert_eq!(config.search.max_results, 3);
        assert_eq!(config.search.api_key_env, "TAVILY_API_KEY");
        assert_eq!(config.history.limit, 6);
        assert_eq!(
            config.tokenizer.path.as_deref(),
            Some(std::path::Path::new("/opt/tokenizer.json"))
        );
    }
}
