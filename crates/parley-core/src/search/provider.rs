//! SearchProvider trait definition.

use parley_types::search::SearchError;

/// Trait for external web search backends.
///
/// Providers return the response body untouched; shape normalization is
/// done by [`super::extract`] so every backend shares the same fallbacks.
pub trait SearchProvider: Send + Sync {
    /// Human-readable provider name (e.g., "tavily").
    fn name(&self) -> &str;

    /// Run a query, asking for at most `max_results` hits.
    fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> impl std::future::Future<Output = Result<serde_json::Value, SearchError>> + Send;
}
