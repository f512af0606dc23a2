//! Bounded Store Module
//!
//! Thread-safe, capacity-limited key-value storage with LRU eviction.

use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::cache::CacheStats;
use crate::error::{RedirectError, Result};

// == Bounded Store ==
/// Capacity-limited map that evicts the least recently used entry when full.
///
/// Every operation takes the internal lock for its own duration only, so the
/// store can be shared freely between tasks. Values are handed out as clones;
/// callers that need shared ownership store `Arc`s.
#[derive(Debug)]
pub struct BoundedStore<K: Hash + Eq, V> {
    inner: Mutex<StoreInner<K, V>>,
}

#[derive(Debug)]
struct StoreInner<K: Hash + Eq, V> {
    /// Key-value storage ordered by recency
    entries: LruCache<K, V>,
    /// Performance statistics
    stats: CacheStats,
}

impl<K: Hash + Eq, V: Clone> BoundedStore<K, V> {
    // == Constructor ==
    /// Creates a new store holding at most `capacity` entries.
    ///
    /// # Errors
    /// `InvalidConfig` when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            RedirectError::InvalidConfig("store capacity must be positive".to_string())
        })?;

        Ok(Self {
            inner: Mutex::new(StoreInner {
                entries: LruCache::new(capacity),
                stats: CacheStats::new(capacity.get()),
            }),
        })
    }

    // == Get ==
    /// Retrieves a value by key and marks it as most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let value = inner.entries.get(key).cloned();
        match value {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        value
    }

    // == Peek ==
    /// Retrieves a value by key without touching recency or statistics.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.lock().entries.peek(key).cloned()
    }

    // == Get Or Insert ==
    /// Returns the value for `key`, inserting `make()` first if it is absent.
    ///
    /// Lookup and insertion happen under one lock acquisition, so concurrent
    /// callers for the same absent key observe a single inserted value.
    /// `make` runs while the lock is held and must not block.
    pub fn get_or_insert_with<F>(&self, key: K, make: F) -> V
    where
        F: FnOnce() -> V,
    {
        let mut inner = self.inner.lock();
        if let Some(value) = inner.entries.get(&key).cloned() {
            inner.stats.record_hit();
            return value;
        }

        inner.stats.record_miss();
        let value = make();
        if inner.entries.push(key, value.clone()).is_some() {
            inner.stats.record_eviction();
        }
        value
    }

    // == Insert ==
    /// Stores a value, replacing any previous value for the key.
    ///
    /// Returns the key evicted to make room, if any.
    pub fn insert(&self, key: K, value: V) -> Option<K> {
        let mut inner = self.inner.lock();
        if inner.entries.contains(&key) {
            inner.entries.put(key, value);
            return None;
        }

        let evicted = inner.entries.push(key, value).map(|(evicted_key, _)| evicted_key);
        if evicted.is_some() {
            inner.stats.record_eviction();
        }
        evicted
    }

    // == Remove ==
    /// Removes an entry by key, returning its value if it was present.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().entries.pop(key)
    }

    // == Remove If ==
    /// Removes the entry for `key` only if `predicate` holds for its value.
    ///
    /// The check and the removal happen under one lock acquisition.
    pub fn remove_if<P>(&self, key: &K, predicate: P) -> Option<V>
    where
        P: FnOnce(&V) -> bool,
    {
        let mut inner = self.inner.lock();
        if inner.entries.peek(key).is_some_and(predicate) {
            inner.entries.pop(key)
        } else {
            None
        }
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    // == Capacity ==
    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.inner.lock().entries.cap().get()
    }
}
