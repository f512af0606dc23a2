//! Cache Entry Module
//!
//! Defines the timestamped value stored for each key of a TTL cache.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A computed value tagged with the instant it was produced.
///
/// Entries are never refreshed in place: a stale entry is removed and a
/// new one is computed in its stead.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The computed value
    pub value: V,
    /// Instant the value was produced
    pub created_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Wraps a freshly computed value, timestamped now.
    pub fn new(value: V) -> Self {
        Self::with_created_at(value, Instant::now())
    }

    /// Wraps a value with an explicit creation instant.
    pub fn with_created_at(value: V, created_at: Instant) -> Self {
        Self { value, created_at }
    }

    // == Age ==
    /// Returns how old the entry is at `now`.
    ///
    /// An entry created after `now` (computed while the caller was waiting)
    /// has age zero.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    // == Is Stale ==
    /// Checks whether the entry outlived `ttl` as observed at `now`.
    ///
    /// Boundary condition: an entry whose age equals `ttl` exactly is still
    /// fresh; it becomes stale once its age strictly exceeds `ttl`.
    pub fn is_stale(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) > ttl
    }
}
