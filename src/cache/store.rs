//! Bounded TTL Cache Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and lazy TTL expiration.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::cache::{CacheEntry, CacheStats, Clock, LruTracker, SystemClock};

// == Bounded TTL Cache ==
/// Fixed-capacity key-value store whose entries expire `ttl` after being stored.
///
/// Expiry is lazy: an entry is only dropped when a `get` finds it stale. When a
/// new key arrives at capacity, the least recently used entry is evicted first.
/// Not synchronized; callers sharing a cache wrap it in a lock.
#[derive(Debug)]
pub struct BoundedTtlCache<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Lifetime of each entry in milliseconds
    ttl_ms: u64,
    clock: Arc<dyn Clock>,
}

impl<K, V> BoundedTtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a cache holding at most `capacity` entries for `ttl` each.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_clock(capacity, ttl, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            capacity,
            ttl_ms: ttl.as_millis() as u64,
            clock,
        }
    }

    // == Get ==
    /// Retrieves a fresh value by key.
    ///
    /// A stale entry is removed and reported as a miss. A fresh entry becomes
    /// the most recently used.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = self.clock.now_ms();

        let (value, ttl_remaining_ms) = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) if entry.is_expired(now, self.ttl_ms) => {
                self.entries.remove(key);
                self.lru.remove(key);
                self.stats.record_expiration();
                self.stats.record_miss();
                self.stats.set_total_entries(self.entries.len());
                trace!("Dropped expired cache entry");
                return None;
            }
            Some(entry) => (
                entry.value.clone(),
                entry.ttl_remaining_ms(now, self.ttl_ms),
            ),
        };

        self.stats.record_hit();
        self.lru.touch(key);
        trace!(ttl_remaining_ms, "Cache hit");
        Some(value)
    }

    // == Set ==
    /// Stores a value, replacing any previous entry for the key.
    ///
    /// A zero-capacity cache ignores every write.
    pub fn set(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        // If not overwriting and at capacity, evict oldest entry
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                trace!("Evicted least recently used cache entry");
            }
        }

        let entry = CacheEntry::new(value, self.clock.now_ms());
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);

        self.stats.set_total_entries(self.entries.len());
    }

    // == Remove ==
    /// Invalidates a single key. Returns whether an entry was present.
    pub fn remove(&mut self, key: &K) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Clear ==
    /// Drops every entry. Statistics counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Number of stored entries, stale ones included until they are read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}
