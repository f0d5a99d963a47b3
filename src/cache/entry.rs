//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

// == Cache Entry ==
/// A cached value together with the time it was stored.
///
/// Entries are never mutated in place; a new `set` replaces the whole entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Storage timestamp (Unix milliseconds)
    pub stored_at_ms: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped with `now_ms`.
    pub fn new(value: V, now_ms: u64) -> Self {
        Self {
            value,
            stored_at_ms: now_ms,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was stored.
    ///
    /// A clock that moved backwards yields an age of zero.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.stored_at_ms)
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `ttl_ms`.
    ///
    /// Boundary condition: an entry is expired once its age is greater than or
    /// equal to the TTL, so a TTL of zero expires on the very next read.
    pub fn is_expired(&self, now_ms: u64, ttl_ms: u64) -> bool {
        self.age_ms(now_ms) >= ttl_ms
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64, ttl_ms: u64) -> u64 {
        ttl_ms.saturating_sub(self.age_ms(now_ms))
    }
}
