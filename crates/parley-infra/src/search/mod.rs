//! HTTP web search client.
//!
//! Posts `{query, max_results}` to a search API (Tavily by default) and
//! returns the JSON body untouched. Source extraction happens in
//! `parley_core::search::extract`, which copes with the response shapes of
//! the various search APIs.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use parley_core::search::provider::SearchProvider;
use parley_types::search::SearchError;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
}

/// Search provider for JSON-over-HTTP search APIs with Bearer auth.
pub struct HttpSearchProvider {
    client: reqwest::Client,
    name: String,
    endpoint: String,
    api_key: SecretString,
}

impl HttpSearchProvider {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: SecretString,
    ) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .map_err(|e| SearchError::Request(e.to_string()))?;

        Ok(Self {
            client,
            name: name.into(),
            endpoint: endpoint.into(),
            api_key,
        })
    }

    /// Name derived from the endpoint host, e.g. `api.tavily.com` -> `tavily`.
    pub fn name_for_endpoint(endpoint: &str) -> String {
        reqwest::Url::parse(endpoint)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .map(|host| {
                let parts: Vec<&str> = host.split('.').collect();
                match parts.len() {
                    0 | 1 => host.clone(),
                    n => parts[n - 2].to_string(),
                }
            })
            .unwrap_or_else(|| "search".to_string())
    }
}

impl SearchProvider for HttpSearchProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<serde_json::Value, SearchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&SearchRequest { query, max_results })
            .send()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::Deserialization(e.to_string()))?;

        debug!(provider = %self.name, "Search response received");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_name_for_endpoint() {
        assert_eq!(
            HttpSearchProvider::name_for_endpoint("https://api.tavily.com/search"),
            "tavily"
        );
        assert_eq!(
            HttpSearchProvider::name_for_endpoint("http://localhost:9000/q"),
            "localhost"
        );
        assert_eq!(HttpSearchProvider::name_for_endpoint("not a url"), "search");
    }

    #[tokio::test]
    async fn test_search_posts_query_and_returns_raw_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/search")
            .match_header("authorization", "Bearer tvly-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "query": "rust async",
                "max_results": 3
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"results": [{"title": "Tokio", "url": "https://tokio.rs"}]}"#)
            .create_async()
            .await;

        let provider = HttpSearchProvider::new(
            "tavily",
            format!("{}/search", server.url()),
            SecretString::from("tvly-test"),
        )
        .unwrap();
        let body = provider.search("rust async", 3).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body["results"][0]["url"], "https://tokio.rs");
    }

    #[tokio::test]
    async fn test_search_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/search")
            .with_status(432)
            .with_body("quota exceeded")
            .create_async()
            .await;

        let provider = HttpSearchProvider::new(
            "tavily",
            format!("{}/search", server.url()),
            SecretString::from("k"),
        )
        .unwrap();
        let err = provider.search("q", 5).await.unwrap_err();
        assert!(matches!(
            err,
            SearchError::Status { status: 432, ref body } if body == "quota exceeded"
        ));
    }
}
