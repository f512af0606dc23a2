//! Video metadata API client.
//!
//! The resolver only needs one read-only call: the part list of a video.
//! [`CollectionSource`] is the seam tests replace with fakes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::types::PageInfo;
use crate::error::{RedirectError, Result};

/// Default base URL of the metadata API
pub const DEFAULT_BASE_URL: &str = "https://api.bilibili.com";

const VIEW_PATH: &str = "/x/web-interface/view";
const USER_AGENT: &str = concat!("bili_redirect/", env!("CARGO_PKG_VERSION"));

/// Fetches the ordered part list of a video.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    async fn fetch_collection(&self, bvid: &str) -> Result<Vec<PageInfo>>;
}

#[derive(Debug, Deserialize)]
struct ViewResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<ViewData>,
}

#[derive(Debug, Deserialize)]
struct ViewData {
    #[serde(default)]
    pages: Vec<PageInfo>,
}

impl ViewResponse {
    fn into_pages(self) -> Result<Vec<PageInfo>> {
        if self.code != 0 {
            return Err(RedirectError::Upstream(format!(
                "api returned code {}: {}",
                self.code, self.message
            )));
        }
        self.data
            .map(|data| data.pages)
            .ok_or_else(|| RedirectError::Upstream("response has no data".to_string()))
    }
}

/// HTTP client for the video view endpoint.
#[derive(Clone)]
pub struct BilibiliClient {
    http: Client,
    base_url: String,
}

impl BilibiliClient {
    /// Create a client against `base_url`, normally [`DEFAULT_BASE_URL`].
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RedirectError::InvalidConfig(format!("http client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CollectionSource for BilibiliClient {
    async fn fetch_collection(&self, bvid: &str) -> Result<Vec<PageInfo>> {
        let url = format!("{}{}", self.base_url, VIEW_PATH);

        let response = self
            .http
            .get(&url)
            .query(&[("bvid", bvid)])
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| RedirectError::Upstream(e.to_string()))?;

        let body: ViewResponse = response
            .json()
            .await
            .map_err(|e| RedirectError::Upstream(e.to_string()))?;

        body.into_pages()
    }
}
