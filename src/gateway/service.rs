//! Search Gateway
//!
//! Serves search and autocomplete from a TTL cache, coalescing concurrent
//! misses into one bounded backend call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{BoundedTtlCache, Clock, SystemClock};
use crate::coalescer::RequestCoalescer;
use crate::config::{Config, GatewayConfig};
use crate::debounce::Debouncer;
use crate::error::{Result, SearchError};
use crate::gateway::{HttpSearchBackend, SearchBackend};
use crate::models::{CacheReport, SearchQuery, SearchResult, StatsResponse, MAX_LIMIT};

/// Shortest trimmed input that reaches the backend for suggestions
pub const MIN_AUTOCOMPLETE_CHARS: usize = 2;

type SharedCache<V> = Arc<Mutex<CacheSlot<V>>>;

// == Cache Slot ==
/// A result cache paired with an invalidation epoch.
///
/// Every invalidation bumps the epoch under the same lock as the cache, and a
/// fetch may only store its result if the epoch it started in is still current.
struct CacheSlot<V> {
    cache: BoundedTtlCache<String, V>,
    epoch: u64,
}

impl<V: Clone> CacheSlot<V> {
    fn new(cache: BoundedTtlCache<String, V>) -> SharedCache<V> {
        Arc::new(Mutex::new(Self { cache, epoch: 0 }))
    }

    fn clear(&mut self) {
        self.cache.clear();
        self.epoch += 1;
    }

    fn remove(&mut self, key: String) -> bool {
        self.epoch += 1;
        self.cache.remove(&key)
    }

    /// Stores `value` unless the cache was invalidated after `epoch`.
    fn store_if_current(&mut self, epoch: u64, key: String, value: V) -> bool {
        if self.epoch != epoch {
            return false;
        }
        self.cache.set(key, value);
        true
    }
}

// == Search Gateway ==
/// Cached, coalesced access to the search backend.
pub struct SearchGateway {
    backend: Arc<dyn SearchBackend>,
    config: GatewayConfig,
    search_cache: SharedCache<SearchResult>,
    autocomplete_cache: SharedCache<Vec<String>>,
    search_requests: RequestCoalescer<SearchResult>,
    autocomplete_requests: RequestCoalescer<Vec<String>>,
}

impl SearchGateway {
    pub fn new(backend: Arc<dyn SearchBackend>, config: GatewayConfig) -> Self {
        Self::with_clock(backend, config, Arc::new(SystemClock))
    }

    /// Creates a gateway whose caches read time from `clock`.
    pub fn with_clock(
        backend: Arc<dyn SearchBackend>,
        config: GatewayConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let search_cache = BoundedTtlCache::with_clock(
            config.search_capacity,
            config.search_ttl,
            Arc::clone(&clock),
        );
        let autocomplete_cache =
            BoundedTtlCache::with_clock(config.autocomplete_capacity, config.autocomplete_ttl, clock);

        Self {
            backend,
            config,
            search_cache: CacheSlot::new(search_cache),
            autocomplete_cache: CacheSlot::new(autocomplete_cache),
            search_requests: RequestCoalescer::new(),
            autocomplete_requests: RequestCoalescer::new(),
        }
    }

    /// Creates a gateway talking HTTP to `config.search_api_url`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = HttpSearchBackend::new(config.search_api_url.clone())?;
        info!(base_url = %backend.base_url(), "Search backend configured");
        Ok(Self::new(Arc::new(backend), config.gateway()))
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    // == Search ==
    /// Returns one page of results for `query`.
    ///
    /// Invalid queries fail before any network call. Timeouts are reported as
    /// `SearchError::Timeout`, every other backend failure as `Transport`.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
        query.validate()?;
        let key = query.cache_key();

        if let Some(hit) = self.search_cache.lock().await.cache.get(&key) {
            debug!(%key, "Search cache hit");
            return Ok(hit);
        }
        debug!(%key, "Search cache miss");

        let backend = Arc::clone(&self.backend);
        let cache = Arc::clone(&self.search_cache);
        let timeout = self.config.search_timeout;
        let query = query.clone();
        let cache_key = key.clone();

        let outcome = self
            .search_requests
            .coalesce(&key, move || async move {
                let epoch = cache.lock().await.epoch;
                let result = with_timeout(timeout, backend.search(&query)).await?;
                let stored = cache
                    .lock()
                    .await
                    .store_if_current(epoch, cache_key, result.clone());
                if !stored {
                    debug!("Search cache invalidated during fetch, result not stored");
                }
                Ok::<_, SearchError>(result)
            })
            .await;

        match &outcome {
            Err(err) if err.is_timeout() => warn!(%key, error = %err, "Search timed out"),
            Err(err) => warn!(%key, error = %err, "Search failed"),
            Ok(_) => {}
        }
        outcome
    }

    // == Autocomplete ==
    /// Suggestions for `text` using the configured default limit.
    pub async fn autocomplete(&self, text: &str) -> Vec<String> {
        self.autocomplete_with_limit(text, self.config.autocomplete_limit)
            .await
    }

    /// Best-effort suggestions for `text`, at most `limit` of them.
    ///
    /// Inputs shorter than two characters and any backend failure yield an empty list.
    pub async fn autocomplete_with_limit(&self, text: &str, limit: u32) -> Vec<String> {
        let text = text.trim();
        if text.chars().count() < MIN_AUTOCOMPLETE_CHARS {
            return Vec::new();
        }

        let limit = limit.clamp(1, MAX_LIMIT);
        let key = format!("{limit}:{text}");

        if let Some(hit) = self.autocomplete_cache.lock().await.cache.get(&key) {
            debug!(%key, "Autocomplete cache hit");
            return hit;
        }

        let backend = Arc::clone(&self.backend);
        let cache = Arc::clone(&self.autocomplete_cache);
        let timeout = self.config.autocomplete_timeout;
        let owned_text = text.to_string();
        let cache_key = key.clone();

        let outcome = self
            .autocomplete_requests
            .coalesce(&key, move || async move {
                let epoch = cache.lock().await.epoch;
                let mut suggestions =
                    with_timeout(timeout, backend.suggest(&owned_text, limit)).await?;
                suggestions.truncate(limit as usize);
                cache
                    .lock()
                    .await
                    .store_if_current(epoch, cache_key, suggestions.clone());
                Ok::<_, SearchError>(suggestions)
            })
            .await;

        outcome.unwrap_or_else(|err| {
            warn!(%key, error = %err, "Autocomplete failed, returning no suggestions");
            Vec::new()
        })
    }

    /// Wraps `autocomplete` for keystroke-driven callers.
    ///
    /// Only the last input of a burst within the configured debounce delay is looked up.
    pub fn debounced_autocomplete(
        self: &Arc<Self>,
    ) -> Debouncer<String, impl Fn(String) -> BoxFuture<'static, Vec<String>> + Send + Sync> {
        let gateway = Arc::clone(self);
        Debouncer::new(self.config.debounce_delay, move |text: String| {
            let gateway = Arc::clone(&gateway);
            async move { gateway.autocomplete(&text).await }.boxed()
        })
    }

    // == Invalidation ==
    /// Drops every cached search page and suggestion list.
    ///
    /// Fetches already in flight still answer their callers but do not
    /// repopulate the caches.
    pub async fn clear_search_cache(&self) {
        self.search_cache.lock().await.clear();
        self.autocomplete_cache.lock().await.clear();
        info!("Search cache cleared");
    }

    /// Drops the cached page for `query`, e.g. after one of its products changed.
    ///
    /// In-flight search fetches will not store their results afterwards.
    pub async fn invalidate(&self, query: &SearchQuery) -> bool {
        self.search_cache.lock().await.remove(query.cache_key())
    }

    // == Stats ==
    pub async fn stats(&self) -> StatsResponse {
        let search = {
            let slot = self.search_cache.lock().await;
            CacheReport::new(
                &slot.cache.stats(),
                slot.cache.capacity(),
                self.search_requests.in_flight().await,
            )
        };
        let autocomplete = {
            let slot = self.autocomplete_cache.lock().await;
            CacheReport::new(
                &slot.cache.stats(),
                slot.cache.capacity(),
                self.autocomplete_requests.in_flight().await,
            )
        };

        StatsResponse {
            search,
            autocomplete,
        }
    }
}

/// Bounds `call` by `limit`. Dropping the call on expiry aborts the underlying request.
async fn with_timeout<T>(limit: Duration, call: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(outcome) => outcome,
        Err(_) => Err(SearchError::Timeout {
            after_ms: limit.as_millis() as u64,
        }),
    }
}
