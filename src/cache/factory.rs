//! Value factory capability consumed by [`TtlCache`](super::TtlCache).

use async_trait::async_trait;

use crate::error::Result;

/// Computes the value for a key on a cache miss.
///
/// Implementations must tolerate being invoked again for the same key after
/// the cached value expires or is evicted.
#[async_trait]
pub trait ValueFactory<K, V>: Send + Sync {
    /// Produce the value for `key`.
    async fn create(&self, key: &K) -> Result<V>;
}
