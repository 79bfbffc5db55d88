//! Web search result types.

use serde::{Deserialize, Serialize};

/// A single source extracted from a search API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSource {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Errors from the external search API.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(String),

    #[error("search API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("search API key is not configured")]
    MissingApiKey,

    #[error("search response could not be parsed: {0}")]
    Deserialization(String),
}
