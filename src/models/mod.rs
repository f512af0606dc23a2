//! Request and Response models for the redirect API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! parsing query strings and serializing JSON response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::RedirectQuery;
pub use responses::{CacheStatsResponse, HealthResponse, StatsResponse};
