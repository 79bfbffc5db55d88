//! LlmProvider trait definition.
//!
//! This is the core abstraction that every model backend implements.

use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends (OpenAI-compatible, Anthropic).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in parley-infra and are responsible for
/// normalizing their wire-format usage into [`parley_types::llm::Usage`].
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "groq", "anthropic").
    fn name(&self) -> &str;

    /// Model used when a request leaves `model` empty.
    fn model(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
