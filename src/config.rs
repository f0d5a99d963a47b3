//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the backend search API
    pub search_api_url: String,
    /// HTTP server port
    pub server_port: u16,
    /// Maximum number of cached search result pages
    pub search_cache_capacity: usize,
    /// Lifetime of a cached search result page, in seconds
    pub search_cache_ttl: u64,
    /// Bound on a backend search call, in milliseconds
    pub search_timeout_ms: u64,
    /// Maximum number of cached suggestion lists
    pub autocomplete_cache_capacity: usize,
    /// Lifetime of a cached suggestion list, in seconds
    pub autocomplete_cache_ttl: u64,
    /// Bound on a backend autocomplete call, in milliseconds
    pub autocomplete_timeout_ms: u64,
    /// Suggestions returned when the caller does not ask for a limit
    pub autocomplete_limit: u32,
    /// Quiet period before a debounced call runs, in milliseconds
    pub debounce_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SEARCH_API_URL` - Backend base URL (default: http://localhost:8080/api)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SEARCH_CACHE_CAPACITY` - Cached search pages (default: 100)
    /// - `SEARCH_CACHE_TTL` - Search result TTL in seconds (default: 60)
    /// - `SEARCH_TIMEOUT_MS` - Search timeout (default: 5000)
    /// - `AUTOCOMPLETE_CACHE_CAPACITY` - Cached suggestion lists (default: 50)
    /// - `AUTOCOMPLETE_CACHE_TTL` - Suggestion TTL in seconds (default: 300)
    /// - `AUTOCOMPLETE_TIMEOUT_MS` - Autocomplete timeout (default: 2000)
    /// - `AUTOCOMPLETE_LIMIT` - Default number of suggestions (default: 5)
    /// - `DEBOUNCE_MS` - Debounce delay (default: 300)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            search_api_url: env::var("SEARCH_API_URL").unwrap_or(defaults.search_api_url),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            search_cache_capacity: env_or("SEARCH_CACHE_CAPACITY", defaults.search_cache_capacity),
            search_cache_ttl: env_or("SEARCH_CACHE_TTL", defaults.search_cache_ttl),
            search_timeout_ms: env_or("SEARCH_TIMEOUT_MS", defaults.search_timeout_ms),
            autocomplete_cache_capacity: env_or(
                "AUTOCOMPLETE_CACHE_CAPACITY",
                defaults.autocomplete_cache_capacity,
            ),
            autocomplete_cache_ttl: env_or("AUTOCOMPLETE_CACHE_TTL", defaults.autocomplete_cache_ttl),
            autocomplete_timeout_ms: env_or(
                "AUTOCOMPLETE_TIMEOUT_MS",
                defaults.autocomplete_timeout_ms,
            ),
            autocomplete_limit: env_or("AUTOCOMPLETE_LIMIT", defaults.autocomplete_limit),
            debounce_ms: env_or("DEBOUNCE_MS", defaults.debounce_ms),
        }
    }

    /// Gateway tuning derived from this configuration.
    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            search_capacity: self.search_cache_capacity,
            search_ttl: Duration::from_secs(self.search_cache_ttl),
            search_timeout: Duration::from_millis(self.search_timeout_ms),
            autocomplete_capacity: self.autocomplete_cache_capacity,
            autocomplete_ttl: Duration::from_secs(self.autocomplete_cache_ttl),
            autocomplete_timeout: Duration::from_millis(self.autocomplete_timeout_ms),
            autocomplete_limit: self.autocomplete_limit,
            debounce_delay: Duration::from_millis(self.debounce_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_api_url: "http://localhost:8080/api".to_string(),
            server_port: 3000,
            search_cache_capacity: 100,
            search_cache_ttl: 60,
            search_timeout_ms: 5000,
            autocomplete_cache_capacity: 50,
            autocomplete_cache_ttl: 300,
            autocomplete_timeout_ms: 2000,
            autocomplete_limit: 5,
            debounce_ms: 300,
        }
    }
}

/// Caching, timeout and debounce settings used by `SearchGateway`.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub search_capacity: usize,
    pub search_ttl: Duration,
    pub search_timeout: Duration,
    pub autocomplete_capacity: usize,
    pub autocomplete_ttl: Duration,
    pub autocomplete_timeout: Duration,
    pub autocomplete_limit: u32,
    pub debounce_delay: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Config::default().gateway()
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
