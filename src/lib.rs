//! Search Gateway - cached, coalesced marketplace search
//!
//! Serves product search and autocomplete from bounded TTL/LRU caches, merging
//! concurrent identical requests into one timed backend call.

pub mod api;
pub mod cache;
pub mod coalescer;
pub mod config;
pub mod debounce;
pub mod error;
pub mod gateway;
pub mod models;

pub use api::AppState;
pub use cache::BoundedTtlCache;
pub use coalescer::RequestCoalescer;
pub use config::{Config, GatewayConfig};
pub use debounce::Debouncer;
pub use error::SearchError;
pub use gateway::SearchGateway;
