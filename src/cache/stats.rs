//! Cache counters
//!
//! Lookup, eviction and occupancy counters. A TTL cache counts one lookup
//! per `get` and adds recomputations and lazy expiry on top.

use serde::Serialize;

/// Point-in-time view of one cache level.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered by a value that was already present and fresh
    pub hits: u64,
    /// Lookups that computed, waited for, or replaced a value
    pub misses: u64,
    /// Slots pushed out to make room for a new key
    pub evictions: u64,
    /// Entries removed after being observed stale
    pub expirations: u64,
    /// Factory invocations
    pub computations: u64,
    /// Slots held when the snapshot was taken
    pub total_entries: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Share of lookups answered by an existing slot, 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
