//! API Module
//!
//! HTTP handlers and routing for the redirect service.
//!
//! # Endpoints
//! - `GET /?bvid=...&cid=...` - Redirect page for a video part
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;
pub mod template;

pub use handlers::*;
pub use routes::create_router;
pub use template::RedirectPage;
