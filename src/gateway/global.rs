//! Process-wide gateway instance
//!
//! The first `init` installs the gateway for the life of the process; later calls
//! return the installed one. `clear_search_cache` is the teardown hook for logout
//! and data-staleness events.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::warn;

use crate::gateway::SearchGateway;

static GATEWAY: OnceCell<Arc<SearchGateway>> = OnceCell::new();

/// Installs `gateway` unless one is already installed, and returns the active instance.
pub fn init(gateway: SearchGateway) -> Arc<SearchGateway> {
    let mut installed = false;
    let active = GATEWAY.get_or_init(|| {
        installed = true;
        Arc::new(gateway)
    });
    if !installed {
        warn!("Search gateway already initialized, keeping the existing instance");
    }
    Arc::clone(active)
}

/// The installed gateway, if any.
pub fn get() -> Option<Arc<SearchGateway>> {
    GATEWAY.get().cloned()
}

/// Clears the installed gateway's caches. No-op before `init`.
pub async fn clear_search_cache() {
    if let Some(gateway) = GATEWAY.get() {
        gateway.clear_search_cache().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::error::Result;
    use crate::gateway::SearchBackend;
    use crate::models::{SearchQuery, SearchResult};
    use async_trait::async_trait;

    struct EmptyBackend;

    #[async_trait]
    impl SearchBackend for EmptyBackend {
        async fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
            Ok(SearchResult::empty(query.page))
        }

        async fn suggest(&self, _text: &str, _limit: u32) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    // Single test: the singleton is shared by every test in the process.
    #[tokio::test]
    async fn test_global_lifecycle() {
        clear_search_cache().await;

        let first = init(SearchGateway::new(
            Arc::new(EmptyBackend),
            GatewayConfig::default(),
        ));
        let second = init(SearchGateway::new(
            Arc::new(EmptyBackend),
            GatewayConfig::default(),
        ));
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &get().unwrap()));

        first.search(&SearchQuery::new("book")).await.unwrap();
        assert_eq!(first.stats().await.search.total_entries, 1);

        clear_search_cache().await;
        assert_eq!(first.stats().await.search.total_entries, 0);
    }
}
