//! Resolver Module
//!
//! Maps a video id and part cid to the part's title and canonical link,
//! backed by two [`TtlCache`](crate::cache::TtlCache) levels and the video
//! metadata API.

mod link;
mod types;
pub mod upstream;

pub use link::{collection_capacity, LinkResolver, ResolverStats, DEFAULT_OUTPUT_BASE_URL};
pub use types::{CollectionInfo, PageInfo, PageKey, ResolvedItem};
pub use upstream::{BilibiliClient, CollectionSource};
