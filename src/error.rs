//! Error types for the search gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Search Error Enum ==
/// Failure of a search or autocomplete request.
///
/// `Clone` so that every caller joined on one coalesced fetch receives the same error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The backend did not answer within the configured bound
    #[error("Search timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// Network failure, non-2xx status or malformed response body
    #[error("Search backend failed{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The query was rejected before any network call
    #[error("Invalid search query: {0}")]
    Validation(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|s| format!(" with status {s}"))
        .unwrap_or_default()
}

impl SearchError {
    pub fn transport(message: impl Into<String>) -> Self {
        SearchError::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SearchError::Timeout { .. })
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = match &self {
            SearchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            SearchError::Transport { .. } => StatusCode::BAD_GATEWAY,
            SearchError::Validation(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the search gateway.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SearchError::Timeout { after_ms: 5000 }.to_string(),
            "Search timed out after 5000ms"
        );
        assert_eq!(
            SearchError::Transport {
                status: Some(503),
                message: "unavailable".to_string()
            }
            .to_string(),
            "Search backend failed with status 503: unavailable"
        );
        assert_eq!(
            SearchError::transport("connection refused").to_string(),
            "Search backend failed: connection refused"
        );
    }

    #[test]
    fn test_timeout_is_distinct_from_transport() {
        assert!(SearchError::Timeout { after_ms: 1 }.is_timeout());
        assert!(!SearchError::transport("boom").is_timeout());
    }

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (SearchError::Timeout { after_ms: 10 }, StatusCode::GATEWAY_TIMEOUT),
            (SearchError::transport("down"), StatusCode::BAD_GATEWAY),
            (SearchError::Validation("bad".to_string()), StatusCode::BAD_REQUEST),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = SearchError::Validation("page must be at least 1".to_string()).into_response();

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            json["error"],
            "Invalid search query: page must be at least 1"
        );
    }
}
