//! LLM provider implementations.
//!
//! Concrete implementations of the [`LlmProvider`] trait defined in
//! `parley-core` for the two wire formats Parley speaks: OpenAI-compatible
//! chat completions and the Anthropic Messages API.
//!
//! [`create_provider`] builds the right one from a [`ProviderConfig`].
//!
//! [`LlmProvider`]: parley_core::llm::provider::LlmProvider

pub mod anthropic;
pub mod openai_compat;

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use secrecy::SecretString;

use parley_core::llm::box_provider::BoxLlmProvider;
use parley_types::llm::{LlmError, ProviderConfig, ProviderType};

use self::anthropic::AnthropicProvider;
use self::openai_compat::OpenAiCompatibleProvider;

/// Per-request timeout for completion calls.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Create a [`BoxLlmProvider`] from a [`ProviderConfig`].
///
/// Both provider families need an API key; `None` fails with
/// [`LlmError::AuthenticationFailed`].
pub fn create_provider(
    config: &ProviderConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key.ok_or(LlmError::AuthenticationFailed)?;

    match config.provider_type {
        ProviderType::Anthropic => {
            let mut provider = AnthropicProvider::new(key, config.model.clone())?
                .with_temperature(config.temperature);
            if let Some(base_url) = config.base_url.as_deref() {
                provider = provider.with_base_url(base_url);
            }
            Ok(BoxLlmProvider::new(provider))
        }
        ProviderType::OpenAiCompatible => {
            let base_url = config
                .base_url
                .as_deref()
                .unwrap_or(OpenAiCompatibleProvider::OPENAI_BASE_URL);
            let provider = OpenAiCompatibleProvider::new(
                config.name.clone(),
                base_url,
                key,
                config.model.clone(),
            )?
            .with_temperature(config.temperature);
            Ok(BoxLlmProvider::new(provider))
        }
    }
}

pub(crate) fn build_http_client() -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| LlmError::Provider {
            message: format!("failed to build HTTP client: {e}"),
        })
}

/// Map a non-success HTTP status to an [`LlmError`].
///
/// Shared by both providers: 401 is an auth failure, 429 a rate limit
/// (honouring `Retry-After` seconds), 503/529 an overload.
pub(crate) fn error_for_status(status: StatusCode, headers: &HeaderMap, body: String) -> LlmError {
    match status.as_u16() {
        401 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1000)),
        },
        503 | 529 => LlmError::Overloaded(body),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}
