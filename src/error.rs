//! Error types for the redirect service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Redirect Error Enum ==
/// Unified error type for the redirect service.
#[derive(Error, Debug, Clone)]
pub enum RedirectError {
    /// Requested video part does not resolve to a link
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected configuration or constructor parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Metadata API request failed or returned an unusable payload
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for RedirectError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            RedirectError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            RedirectError::InvalidConfig(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            RedirectError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            RedirectError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the redirect service.
pub type Result<T> = std::result::Result<T, RedirectError>;
