//! API Handlers
//!
//! HTTP request handlers for the redirect service endpoints.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::template::RedirectPage;
use crate::config::Config;
use crate::error::{RedirectError, Result};
use crate::models::{HealthResponse, RedirectQuery, StatsResponse};
use crate::resolver::{BilibiliClient, CollectionSource, LinkResolver};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Two-level link resolver
    pub resolver: Arc<LinkResolver>,
    /// Pre-parsed redirect page
    pub page: Arc<RedirectPage>,
    /// Value of the `Cache-Control: max-age` directive, in seconds
    pub max_age: u64,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(resolver: LinkResolver, page: RedirectPage) -> Self {
        let max_age = resolver.ttl().as_secs();
        Self {
            resolver: Arc::new(resolver),
            page: Arc::new(page),
            max_age,
        }
    }

    /// Creates a new AppState from configuration, talking to the real
    /// metadata API.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client =
            BilibiliClient::with_base_url(&config.upstream_base_url, config.upstream_timeout())?;
        Self::with_source(config, Arc::new(client))
    }

    /// Creates a new AppState from configuration with the given metadata
    /// source.
    pub fn with_source(config: &Config, source: Arc<dyn CollectionSource>) -> Result<Self> {
        config.validate()?;
        let resolver = LinkResolver::new(
            config.cache_capacity,
            config.cache_ttl(),
            config.output_base_url.clone(),
            source,
        )?;
        let page = RedirectPage::embedded(config.about_url.as_deref())?;
        Ok(Self::new(resolver, page))
    }
}

/// Handler for GET /?bvid=...&cid=...
///
/// Renders the redirect page for a video part, or 404 when the query is
/// malformed or the part cannot be resolved. A query string that does not
/// even deserialize (duplicated keys, bad encoding) is malformed too.
pub async fn redirect_handler(
    State(state): State<AppState>,
    query: Option<Query<RedirectQuery>>,
) -> Result<Response> {
    let invalid = || RedirectError::NotFound("invalid video reference".to_string());
    let Query(query) = query.ok_or_else(invalid)?;
    let (bvid, cid) = query.parse().ok_or_else(invalid)?;

    let item = state
        .resolver
        .resolve(bvid, cid)
        .await
        .ok_or_else(|| RedirectError::NotFound(format!("{bvid}/{cid}")))?;

    let body = state.page.render(&item);
    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CACHE_CONTROL, format!("public, max-age={}", state.max_age)),
        ],
        body,
    )
        .into_response())
}

/// Handler for GET /stats
///
/// Returns statistics of both cache levels.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.resolver.stats();
    Json(StatsResponse::new(state.max_age, &stats))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
