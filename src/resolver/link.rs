//! Two-level link resolver.
//!
//! Requests are answered from an item cache keyed by (bvid, cid). Its
//! factory reads the collection cache keyed by bvid, which fetches the whole
//! part list of a video once and serves every part of it. Failed fetches and
//! unknown parts are cached like successful lookups, for the same TTL.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, warn};

use super::types::{CollectionInfo, PageKey, ResolvedItem};
use super::upstream::CollectionSource;
use crate::cache::{CacheStats, TtlCache, ValueFactory};
use crate::error::Result;

/// Default prefix of generated links
pub const DEFAULT_OUTPUT_BASE_URL: &str = "https://www.bilibili.com/video/";

/// Collection cache capacity for a given item cache capacity.
///
/// A video usually has several parts, so fewer collections than items
/// need to stay resident.
pub fn collection_capacity(item_capacity: usize) -> usize {
    item_capacity / 5 + 1
}

// == Collection Factory ==
struct CollectionFactory {
    source: Arc<dyn CollectionSource>,
}

#[async_trait]
impl ValueFactory<String, CollectionInfo> for CollectionFactory {
    async fn create(&self, bvid: &String) -> Result<CollectionInfo> {
        match self.source.fetch_collection(bvid).await {
            Ok(pages) => Ok(CollectionInfo::from(pages)),
            Err(e) => {
                warn!(%bvid, error = %e, "collection fetch failed, caching unknown marker");
                Ok(CollectionInfo::Unknown)
            }
        }
    }
}

// == Item Factory ==
struct ItemFactory {
    collections: Arc<TtlCache<String, CollectionInfo>>,
    output_base_url: String,
}

#[async_trait]
impl ValueFactory<PageKey, Option<ResolvedItem>> for ItemFactory {
    async fn create(&self, key: &PageKey) -> Result<Option<ResolvedItem>> {
        let collection = self.collections.get(&key.bvid).await?;
        Ok(collection.find(key.cid).map(|page| ResolvedItem {
            title: page.label.as_str().into(),
            url: format!("{}{}?p={}", self.output_base_url, key.bvid, page.page).into(),
        }))
    }
}

/// Statistics of both cache levels.
#[derive(Debug, Clone, Serialize)]
pub struct ResolverStats {
    pub items: CacheStats,
    pub collections: CacheStats,
}

// == Link Resolver ==
/// Resolves (bvid, cid) pairs to a part title and canonical link.
pub struct LinkResolver {
    items: TtlCache<PageKey, Option<ResolvedItem>>,
    collections: Arc<TtlCache<String, CollectionInfo>>,
}

impl LinkResolver {
    /// Builds both cache levels.
    ///
    /// # Arguments
    /// * `capacity` - Item cache capacity; the collection cache gets
    ///   [`collection_capacity`] of it
    /// * `ttl` - Lifetime of entries at both levels
    /// * `output_base_url` - Prefix of generated links, followed by the bvid
    /// * `source` - Metadata API collaborator
    ///
    /// # Errors
    /// `InvalidConfig` when `capacity` or `ttl` is zero.
    pub fn new(
        capacity: usize,
        ttl: Duration,
        output_base_url: impl Into<String>,
        source: Arc<dyn CollectionSource>,
    ) -> Result<Self> {
        let collections: Arc<TtlCache<String, CollectionInfo>> = Arc::new(TtlCache::new(
            collection_capacity(capacity),
            ttl,
            CollectionFactory { source },
        )?);
        let items: TtlCache<PageKey, Option<ResolvedItem>> = TtlCache::new(
            capacity,
            ttl,
            ItemFactory {
                collections: Arc::clone(&collections),
                output_base_url: output_base_url.into(),
            },
        )?;

        Ok(Self { items, collections })
    }

    /// Looks up the title and link of part `cid` of video `bvid`.
    ///
    /// Returns `None` when the video has no such part or its metadata could
    /// not be fetched.
    pub async fn resolve(&self, bvid: &str, cid: i64) -> Option<ResolvedItem> {
        let key = PageKey::new(bvid, cid);
        match self.items.get(&key).await {
            Ok(item) => item,
            Err(e) => {
                error!(%key, error = %e, "link resolution failed");
                None
            }
        }
    }

    pub fn ttl(&self) -> Duration {
        self.items.ttl()
    }

    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            items: self.items.stats(),
            collections: self.collections.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RedirectError;
    use crate::resolver::types::PageInfo;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(60);

    /// Serves one fixed collection for "BV1"; fails on demand.
    #[derive(Default)]
    struct FakeSource {
        fetches: AtomicUsize,
        failing: AtomicBool,
    }

    #[async_trait]
    impl CollectionSource for FakeSource {
        async fn fetch_collection(&self, bvid: &str) -> Result<Vec<PageInfo>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(RedirectError::Upstream("connection reset".to_string()));
            }
            match bvid {
                "BV1" => Ok(vec![
                    PageInfo::new(7, 1, "Intro"),
                    PageInfo::new(8, 2, "Main"),
                ]),
                _ => Ok(Vec::new()),
            }
        }
    }

    fn resolver_with(source: Arc<FakeSource>) -> LinkResolver {
        LinkResolver::new(100, TTL, "https://example.test/video/", source).unwrap()
    }

    #[test]
    fn test_collection_capacity() {
        assert_eq!(collection_capacity(10_000), 2001);
        assert_eq!(collection_capacity(4), 1);
        assert_eq!(collection_capacity(1), 1);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = LinkResolver::new(0, TTL, "x", Arc::new(FakeSource::default()));
        assert!(matches!(result, Err(RedirectError::InvalidConfig(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_known_part() {
        let resolver = resolver_with(Arc::new(FakeSource::default()));

        let item = resolver.resolve("BV1", 7).await.unwrap();
        assert_eq!(&*item.title, "Intro");
        assert_eq!(&*item.url, "https://example.test/video/BV1?p=1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_unknown_part_is_absent_and_cached() {
        let source = Arc::new(FakeSource::default());
        let resolver = resolver_with(Arc::clone(&source));

        assert!(resolver.resolve("BV1", 99).await.is_none());
        assert!(resolver.resolve("BV1", 99).await.is_none());

        let stats = resolver.stats();
        assert_eq!(stats.items.computations, 1);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parts_of_one_video_share_one_fetch() {
        let source = Arc::new(FakeSource::default());
        let resolver = resolver_with(Arc::clone(&source));

        let first = resolver.resolve("BV1", 7).await.unwrap();
        let second = resolver.resolve("BV1", 8).await.unwrap();

        assert_eq!(&*first.title, "Intro");
        assert_eq!(&*second.url, "https://example.test/video/BV1?p=2");
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.stats().collections.computations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_fetch_once() {
        let source = Arc::new(FakeSource::default());
        let resolver = Arc::new(resolver_with(Arc::clone(&source)));

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let resolver = Arc::clone(&resolver);
                tokio::spawn(async move { resolver.resolve("BV1", 7 + (i % 2)).await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_some());
        }
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    // Failures are memoized for the whole TTL. This shields the metadata API
    // from retries at the cost of hiding a recovery until the entry expires.
    #[tokio::test(start_paused = true)]
    async fn test_upstream_failure_cached_for_ttl() {
        let source = Arc::new(FakeSource::default());
        source.failing.store(true, Ordering::SeqCst);
        let resolver = resolver_with(Arc::clone(&source));

        assert!(resolver.resolve("BV1", 7).await.is_none());
        assert!(resolver.resolve("BV1", 8).await.is_none());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        // Upstream recovers, but the unknown marker is still fresh
        source.failing.store(false, Ordering::SeqCst);
        tokio::time::advance(TTL - Duration::from_secs(1)).await;
        assert!(resolver.resolve("BV1", 7).await.is_none());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        // Both levels expire, the next request fetches again
        tokio::time::advance(Duration::from_secs(2)).await;
        let item = resolver.resolve("BV1", 7).await.unwrap();
        assert_eq!(&*item.title, "Intro");
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_item_refetches_collection() {
        let source = Arc::new(FakeSource::default());
        let resolver = resolver_with(Arc::clone(&source));

        resolver.resolve("BV1", 7).await.unwrap();
        tokio::time::advance(TTL + Duration::from_secs(1)).await;
        resolver.resolve("BV1", 7).await.unwrap();

        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
        let stats = resolver.stats();
        assert_eq!(stats.items.expirations, 1);
        assert_eq!(stats.collections.expirations, 1);
    }
}
