//! Cache Module
//!
//! Provides a generic single-flight cache with TTL expiry and LRU eviction.

mod entry;
mod factory;
mod stats;
mod store;
mod ttl;


// Re-export public types
pub use entry::CacheEntry;
pub use factory::ValueFactory;
pub use stats::CacheStats;
pub use store::BoundedStore;
pub use ttl::TtlCache;
