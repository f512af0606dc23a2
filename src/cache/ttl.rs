//! TTL Cache Module
//!
//! Single-flight, time-to-live cache on top of [`BoundedStore`].
//!
//! Each key maps to a shared computation slot holding the factory's outcome.
//! The first caller to find a slot empty starts the factory; concurrent
//! callers for the same key await that one computation and receive the same
//! result, error included. A failed slot is dropped once observed, so the
//! next caller retries. Expiry is lazy: a caller that observes a stale entry
//! removes it (under the eviction lock, after re-checking it) and then goes
//! through the get-or-compute path again, where it either finds a value
//! refreshed by another caller or starts the single recomputation.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::{BoundedStore, CacheEntry, CacheStats, ValueFactory};
use crate::error::{RedirectError, Result};

type Outcome<V> = Result<CacheEntry<V>>;
type Slot<V> = Arc<OnceCell<Outcome<V>>>;

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
    expirations: AtomicU64,
}

// == TTL Cache ==
/// Capacity-bounded cache whose values are produced by a [`ValueFactory`]
/// and recomputed once they outlive the configured TTL.
pub struct TtlCache<K: Hash + Eq, V> {
    ttl: Duration,
    store: BoundedStore<K, Slot<V>>,
    factory: Arc<dyn ValueFactory<K, V>>,
    /// Serializes the stale read-check-remove sequence
    eviction_lock: Mutex<()>,
    counters: Arc<Counters>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache holding at most `capacity` keys, each fresh for `ttl`.
    ///
    /// # Errors
    /// `InvalidConfig` when `capacity` or `ttl` is zero.
    pub fn new<F>(capacity: usize, ttl: Duration, factory: F) -> Result<Self>
    where
        F: ValueFactory<K, V> + 'static,
    {
        if ttl.is_zero() {
            return Err(RedirectError::InvalidConfig(
                "cache ttl must be positive".to_string(),
            ));
        }

        Ok(Self {
            ttl,
            store: BoundedStore::new(capacity)?,
            factory: Arc::new(factory),
            eviction_lock: Mutex::new(()),
            counters: Arc::new(Counters::default()),
        })
    }

    // == Get ==
    /// Returns the cached value for `key`, computing it if absent or stale.
    ///
    /// A call counts as one hit when a fresh value was already present, and
    /// as one miss otherwise.
    ///
    /// # Errors
    /// Propagates the factory's error to every caller that joined the failed
    /// computation. Nothing is cached in that case, so a later call retries.
    pub async fn get(&self, key: &K) -> Result<V> {
        let now = Instant::now();
        let (entry, ready) = match self.get_or_compute(key).await {
            Ok(found) => found,
            Err(e) => {
                self.record_lookup(false);
                return Err(e);
            }
        };
        if !entry.is_stale(now, self.ttl) {
            self.record_lookup(ready);
            return Ok(entry.value);
        }

        self.record_lookup(false);
        self.evict_if_stale(key);
        let (entry, _) = self.get_or_compute(key).await?;
        Ok(entry.value)
    }

    /// Returns the slot's entry and whether it was already computed.
    async fn get_or_compute(&self, key: &K) -> Result<(CacheEntry<V>, bool)> {
        let slot = self.slot_for(key);
        if let Some(outcome) = slot.get() {
            return outcome.clone().map(|entry| (entry, true));
        }

        // Run in a detached task: dropping this caller must not cancel a
        // computation other callers are waiting on.
        let factory = Arc::clone(&self.factory);
        let counters = Arc::clone(&self.counters);
        let owned_key = key.clone();
        let waiter = Arc::clone(&slot);
        let computation = tokio::spawn(async move {
            waiter
                .get_or_init(|| compute(factory, counters, owned_key))
                .await
                .clone()
        });

        let outcome = computation
            .await
            .map_err(|e| RedirectError::Internal(format!("cache computation aborted: {e}")))?;
        if outcome.is_err() {
            self.discard_failed(key, &slot);
        }
        outcome.map(|entry| (entry, false))
    }

    /// Returns the key's slot, replacing one that holds a failed outcome.
    fn slot_for(&self, key: &K) -> Slot<V> {
        let slot = self
            .store
            .get_or_insert_with(key.clone(), || Arc::new(OnceCell::new()));
        if matches!(slot.get(), Some(Err(_))) {
            self.discard_failed(key, &slot);
            return self
                .store
                .get_or_insert_with(key.clone(), || Arc::new(OnceCell::new()));
        }
        slot
    }

    fn discard_failed(&self, key: &K, failed: &Slot<V>) {
        self.store
            .remove_if(key, |current| Arc::ptr_eq(current, failed));
    }

    fn evict_if_stale(&self, key: &K) {
        let _guard = self.eviction_lock.lock();
        let now = Instant::now();
        let removed = self.store.remove_if(key, |slot| {
            matches!(slot.get(), Some(Ok(entry)) if entry.is_stale(now, self.ttl))
        });
        if removed.is_some() {
            self.counters.expirations.fetch_add(1, Ordering::Relaxed);
            debug!(?key, "removed stale cache entry");
        }
    }

    fn record_lookup(&self, hit: bool) {
        let counter = if hit {
            &self.counters.hits
        } else {
            &self.counters.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.store.stats();
        stats.hits = self.counters.hits.load(Ordering::Relaxed);
        stats.misses = self.counters.misses.load(Ordering::Relaxed);
        stats.computations = self.counters.computations.load(Ordering::Relaxed);
        stats.expirations = self.counters.expirations.load(Ordering::Relaxed);
        stats
    }

    /// Number of keys currently held, including in-flight computations.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Runs the factory once for a slot. A panicking factory becomes an
/// `Internal` outcome shared by every waiter instead of a retried init.
async fn compute<K, V>(
    factory: Arc<dyn ValueFactory<K, V>>,
    counters: Arc<Counters>,
    key: K,
) -> Outcome<V>
where
    K: Debug + Send + Sync + 'static,
    V: Send + 'static,
{
    counters.computations.fetch_add(1, Ordering::Relaxed);
    debug!(?key, "computing cache entry");
    let value = tokio::spawn(async move { factory.create(&key).await })
        .await
        .map_err(|e| RedirectError::Internal(format!("cache factory panicked: {e}")))??;
    Ok(CacheEntry::new(value))
}
