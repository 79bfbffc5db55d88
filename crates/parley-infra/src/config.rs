//! Configuration loading for Parley.
//!
//! Reads `config.toml` (from `PARLEY_CONFIG`, else `{data_dir}/config.toml`)
//! into [`ParleyConfig`]. Falls back to defaults when the file is missing or
//! malformed. API keys never live in the file: each provider section names
//! the environment variable that holds its key.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use parley_types::config::ParleyConfig;

use crate::sqlite::pool::database_url_for;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PARLEY_DATA_DIR";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "PARLEY_CONFIG";

/// Resolve the data directory.
///
/// Priority:
/// 1. `PARLEY_DATA_DIR` environment variable
/// 2. `~/.parley`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".parley");
    }

    // Last resort: current directory
    PathBuf::from(".parley")
}

/// Path of the config file for `data_dir`, honouring `PARLEY_CONFIG`.
pub fn config_path(data_dir: &Path) -> PathBuf {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => data_dir.join("config.toml"),
    }
}

/// Load configuration for `data_dir`.
pub async fn load_config(data_dir: &Path) -> ParleyConfig {
    load_config_from(&config_path(data_dir)).await
}

/// Load configuration from an explicit file.
///
/// - If the file does not exist, returns [`ParleyConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_config_from(config_path: &Path) -> ParleyConfig {
    let content = match tokio::fs::read_to_string(config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", config_path.display());
            return ParleyConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ParleyConfig::default();
        }
    };

    match toml::from_str::<ParleyConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ParleyConfig::default()
        }
    }
}

/// Database URL: the configured one, else `{data_dir}/parley.db`.
pub fn database_url(config: &ParleyConfig, data_dir: &Path) -> String {
    config
        .database
        .url
        .clone()
        .unwrap_or_else(|| database_url_for(data_dir))
}

/// Read an API key from the named environment variable.
///
/// Unset or blank variables yield `None`.
pub fn resolve_api_key(env_name: &str) -> Option<SecretString> {
    std::env::var(env_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}
