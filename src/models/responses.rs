//! Response DTOs for the redirect API
//!
//! Defines the structure of outgoing JSON bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::resolver::ResolverStats;

/// Statistics of one cache level
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub computations: u64,
    pub total_entries: usize,
    pub capacity: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<&CacheStats> for CacheStatsResponse {
    fn from(stats: &CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            computations: stats.computations,
            total_entries: stats.total_entries,
            capacity: stats.capacity,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Entry lifetime in seconds
    pub ttl_seconds: u64,
    /// Item-level cache, keyed by (bvid, cid)
    pub items: CacheStatsResponse,
    /// Collection-level cache, keyed by bvid
    pub collections: CacheStatsResponse,
}

impl StatsResponse {
    /// Creates a new StatsResponse from resolver statistics
    pub fn new(ttl_seconds: u64, stats: &ResolverStats) -> Self {
        Self {
            ttl_seconds,
            items: (&stats.items).into(),
            collections: (&stats.collections).into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
