//! BoxSearchProvider -- object-safe dynamic dispatch wrapper for SearchProvider.
//!
//! Same blanket-impl pattern as [`crate::llm::box_provider::BoxLlmProvider`].

use std::future::Future;
use std::pin::Pin;

use tracing::{Instrument, info_span};

use parley_types::search::SearchError;

use super::provider::SearchProvider;

/// Object-safe version of [`SearchProvider`] with boxed futures.
pub trait SearchProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn search_boxed<'a>(
        &'a self,
        query: &'a str,
        max_results: usize,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, SearchError>> + Send + 'a>>;
}

impl<T: SearchProvider> SearchProviderDyn for T {
    fn name(&self) -> &str {
        SearchProvider::name(self)
    }

    fn search_boxed<'a>(
        &'a self,
        query: &'a str,
        max_results: usize,
    ) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, SearchError>> + Send + 'a>> {
        Box::pin(self.search(query, max_results))
    }
}

/// Type-erased search provider.
pub struct BoxSearchProvider {
    inner: Box<dyn SearchProviderDyn + Send + Sync>,
}

impl BoxSearchProvider {
    pub fn new<T: SearchProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Run a query inside a `search.query` span.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<serde_json::Value, SearchError> {
        let span = info_span!(
            "search.query",
            search.provider = self.name(),
            search.max_results = max_results,
        );
        self.inner.search_boxed(query, max_results).instrument(span).await
    }
}
