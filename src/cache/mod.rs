//! Cache Module
//!
//! Provides in-memory caching with lazy TTL expiration and LRU eviction.

mod clock;
mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::BoundedTtlCache;
