//! API Handlers
//!
//! HTTP request handlers for each search service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::config::Config;
use crate::error::Result;
use crate::gateway::SearchGateway;
use crate::models::{
    AutocompleteParams, HealthResponse, MessageResponse, SearchParams, SearchResult,
    StatsResponse, SuggestionsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<SearchGateway>,
}

impl AppState {
    pub fn new(gateway: Arc<SearchGateway>) -> Self {
        Self { gateway }
    }

    /// Creates a new AppState with an HTTP-backed gateway built from the Config.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Arc::new(SearchGateway::from_config(config)?)))
    }
}

/// Handler for GET /search
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResult>> {
    let query = params.into_query()?;
    let result = state.gateway.search(&query).await?;

    Ok(Json(result))
}

/// Handler for GET /search/autocomplete
///
/// Never fails: backend problems yield an empty suggestion list.
pub async fn autocomplete_handler(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParams>,
) -> Json<SuggestionsResponse> {
    let suggestions = match params.limit {
        Some(limit) => state.gateway.autocomplete_with_limit(&params.q, limit).await,
        None => state.gateway.autocomplete(&params.q).await,
    };

    Json(SuggestionsResponse::new(suggestions))
}

/// Handler for DELETE /search/cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.gateway.clear_search_cache().await;
    Json(MessageResponse::new("Search cache cleared"))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.gateway.stats().await)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
