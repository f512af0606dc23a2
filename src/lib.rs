//! BiliRedirect - canonical links for video parts
//!
//! Resolves a video id and part cid to the part's title and link, caching
//! metadata lookups in two single-flight TTL/LRU cache levels.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod resolver;

pub use api::AppState;
pub use config::Config;
pub use error::{RedirectError, Result};
pub use resolver::LinkResolver;
