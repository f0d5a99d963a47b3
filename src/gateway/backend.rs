//! Search Backend
//!
//! The seam between the gateway and the external search API.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, SearchError};
use crate::models::{SearchQuery, SearchResult, SuggestionsResponse};

/// Longest backend error body echoed into a `Transport` error
const MAX_ERROR_BODY: usize = 200;

// == Search Backend Trait ==
/// Source of search results and autocomplete suggestions.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult>;

    async fn suggest(&self, text: &str, limit: u32) -> Result<Vec<String>>;
}

// == HTTP Backend ==
/// Backend reached over HTTP.
///
/// - `GET {base}/search?q=..&page=..&limit=..` plus one parameter per filter
/// - `GET {base}/search/autocomplete?q=..&limit=..`
#[derive(Debug, Clone)]
pub struct HttpSearchBackend {
    client: Client,
    base_url: String,
}

impl HttpSearchBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "Calling search backend");

        let response = self.client.get(&url).query(params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body.chars().take(MAX_ERROR_BODY).collect()
            };
            return Err(SearchError::Transport {
                status: Some(status.as_u16()),
                message,
            });
        }

        response.json::<T>().await.map_err(|err| SearchError::Transport {
            status: Some(status.as_u16()),
            message: format!("malformed response body: {err}"),
        })
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
        self.get_json("search", &query.to_query_params()).await
    }

    async fn suggest(&self, text: &str, limit: u32) -> Result<Vec<String>> {
        let params = [
            ("q".to_string(), text.to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        let body: SuggestionsResponse = self.get_json("search/autocomplete", &params).await?;
        Ok(body.suggestions)
    }
}
