//! Value types flowing through the link resolver.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

/// One part of a video as listed by the metadata API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageInfo {
    /// Content id of the part; the sub-identifier requests resolve by
    pub cid: i64,
    /// 1-based position of the part, used for the `?p=` query
    pub page: u32,
    /// Part title
    #[serde(rename = "part", default)]
    pub label: String,
}

impl PageInfo {
    pub fn new(cid: i64, page: u32, label: impl Into<String>) -> Self {
        Self {
            cid,
            page,
            label: label.into(),
        }
    }
}

/// Full ordered part list of one video, or the marker for a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionInfo {
    Pages(Arc<[PageInfo]>),
    /// The metadata fetch failed; cached like a real listing
    Unknown,
}

impl CollectionInfo {
    /// Returns the first part whose cid matches.
    pub fn find(&self, cid: i64) -> Option<&PageInfo> {
        match self {
            CollectionInfo::Pages(pages) => pages.iter().find(|page| page.cid == cid),
            CollectionInfo::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, CollectionInfo::Unknown)
    }
}

impl From<Vec<PageInfo>> for CollectionInfo {
    fn from(pages: Vec<PageInfo>) -> Self {
        CollectionInfo::Pages(pages.into())
    }
}

/// Title and canonical link of a resolved video part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    pub title: Arc<str>,
    pub url: Arc<str>,
}

/// Item cache key: video id plus part cid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub bvid: String,
    pub cid: i64,
}

impl PageKey {
    pub fn new(bvid: impl Into<String>, cid: i64) -> Self {
        Self {
            bvid: bvid.into(),
            cid,
        }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bvid, self.cid)
    }
}
