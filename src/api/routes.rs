//! API Routes
//!
//! Configures the Axum router with all redirect service endpoints.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, redirect_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /?bvid=...&cid=...` - Redirect page for a video part
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// Any other path answers 404.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(redirect_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
