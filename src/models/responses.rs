//! Response DTOs for the search service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;

/// Autocomplete suggestions. Also the body of the backend autocomplete endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

impl SuggestionsResponse {
    pub fn new(suggestions: Vec<String>) -> Self {
        Self { suggestions }
    }
}

/// Response body for `DELETE /search/cache`
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Statistics for one cache, as reported by `GET /stats`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheReport {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    pub capacity: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Keys with a fetch currently in flight
    pub in_flight: usize,
}

impl CacheReport {
    pub fn new(stats: &CacheStats, capacity: usize, in_flight: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            capacity,
            hit_rate: stats.hit_rate(),
            in_flight,
        }
    }
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsResponse {
    pub search: CacheReport,
    pub autocomplete: CacheReport,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
