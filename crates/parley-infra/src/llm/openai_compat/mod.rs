//! OpenAI-compatible LLM provider implementation.
//!
//! A single [`OpenAiCompatibleProvider`] serves any endpoint that speaks
//! OpenAI chat completions (OpenAI, Groq, Together, local servers) via a
//! configurable base URL and Bearer authentication.

pub mod types;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use parley_core::llm::provider::LlmProvider;
use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason};

use self::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::llm::{build_http_client, error_for_status};

/// Unified provider for any OpenAI-compatible API.
///
/// Does NOT derive Debug, same as
/// [`super::anthropic::client::AnthropicProvider`].
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    provider_name: String,
    base_url: String,
    api_key: SecretString,
    model: String,
    temperature: Option<f64>,
}

impl OpenAiCompatibleProvider {
    pub const OPENAI_BASE_URL: &'static str = "https://api.openai.com/v1";

    /// Create a provider for `base_url` (e.g. `https://api.groq.com/openai/v1`).
    pub fn new(
        provider_name: String,
        base_url: &str,
        api_key: SecretString,
        model: String,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client()?,
            provider_name,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature: None,
        })
    }

    /// Temperature applied when a request does not set one.
    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Convert a generic request; the system prompt becomes the first message.
    fn to_openai_request(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.extend(request.messages.iter().map(|m| ChatMessage {
            role: m.role.to_string(),
            content: m.content.clone(),
        }));

        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        ChatCompletionRequest {
            model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature.or(self.temperature),
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_openai_request(request);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let raw = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &headers, raw));
        }

        let oai_resp: ChatCompletionResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        let stop_reason = oai_resp
            .finish_reason()
            .and_then(|s| s.parse().ok())
            .unwrap_or(StopReason::EndTurn);
        let usage = oai_resp.normalized_usage();

        debug!(
            provider = %self.provider_name,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Completion received"
        );

        let model = if oai_resp.model.is_empty() {
            body.model
        } else {
            oai_resp.model.clone()
        };

        Ok(CompletionResponse {
            content: oai_resp.text(),
            id: oai_resp.id,
            model,
            stop_reason,
            usage,
        })
    }
}
