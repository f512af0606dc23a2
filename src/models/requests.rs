//! Request DTOs for the redirect API
//!
//! Defines the structure of incoming query strings.

use serde::Deserialize;

/// Query string of the redirect endpoint (`GET /?bvid=...&cid=...`)
///
/// Both fields are kept as raw strings so that malformed values map to a
/// "not found" answer. The handler also answers 404 when the query string
/// cannot be deserialized at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedirectQuery {
    /// Video id, `BV` followed by ASCII alphanumerics
    pub bvid: Option<String>,
    /// Part content id, decimal digits
    pub cid: Option<String>,
}

impl RedirectQuery {
    /// Validates the query and returns the parsed (bvid, cid) pair.
    ///
    /// Returns None if either field is missing or malformed.
    pub fn parse(&self) -> Option<(&str, i64)> {
        let bvid = self.bvid.as_deref()?;
        let cid = self.cid.as_deref()?;

        let id_body = bvid.strip_prefix("BV")?;
        if id_body.is_empty() || !id_body.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        if cid.is_empty() || !cid.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some((bvid, cid.parse().ok()?))
    }
}
