//! Configuration Module
//!
//! Handles loading and validating server configuration from environment variables.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{RedirectError, Result};
use crate::resolver::{upstream::DEFAULT_BASE_URL, DEFAULT_OUTPUT_BASE_URL};

/// Server configuration parameters.
///
/// Values come from environment variables with sensible defaults. A variable
/// that is set but cannot be parsed is an error rather than a silent default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub listen_addr: SocketAddr,
    /// Runtime worker threads
    pub worker_threads: usize,
    /// Maximum number of resolved links kept in the item cache
    pub cache_capacity: usize,
    /// Lifetime of cached entries in seconds, also sent as `max-age`
    pub cache_lifetime: u64,
    /// Link shown on the redirect page, empty when unset
    pub about_url: Option<String>,
    /// Base URL of the video metadata API
    pub upstream_base_url: String,
    /// Metadata request timeout in seconds
    pub upstream_timeout: u64,
    /// Prefix of generated video links
    pub output_base_url: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LISTEN_ADDR` - Bind address (default: 127.0.0.1:13637)
    /// - `WORKER_THREADS` - Runtime worker threads (default: 1)
    /// - `CACHE_CAPACITY` - Item cache capacity (default: 10000)
    /// - `CACHE_LIFETIME` - Entry lifetime in seconds (default: 3600)
    /// - `ABOUT_URL` - About link on the redirect page (default: unset)
    /// - `UPSTREAM_BASE_URL` - Metadata API base URL
    /// - `UPSTREAM_TIMEOUT` - Metadata request timeout in seconds (default: 10)
    /// - `OUTPUT_BASE_URL` - Prefix of generated links
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            listen_addr: parse_var(&lookup, "LISTEN_ADDR", defaults.listen_addr)?,
            worker_threads: parse_var(&lookup, "WORKER_THREADS", defaults.worker_threads)?,
            cache_capacity: parse_var(&lookup, "CACHE_CAPACITY", defaults.cache_capacity)?,
            cache_lifetime: parse_var(&lookup, "CACHE_LIFETIME", defaults.cache_lifetime)?,
            about_url: lookup("ABOUT_URL").filter(|url| !url.is_empty()),
            upstream_base_url: lookup("UPSTREAM_BASE_URL").unwrap_or(defaults.upstream_base_url),
            upstream_timeout: parse_var(&lookup, "UPSTREAM_TIMEOUT", defaults.upstream_timeout)?,
            output_base_url: lookup("OUTPUT_BASE_URL").unwrap_or(defaults.output_base_url),
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(invalid("WORKER_THREADS must be positive"));
        }
        if self.cache_capacity == 0 {
            return Err(invalid("CACHE_CAPACITY must be positive"));
        }
        if self.cache_lifetime == 0 {
            return Err(invalid("CACHE_LIFETIME must be positive"));
        }
        if self.upstream_timeout == 0 {
            return Err(invalid("UPSTREAM_TIMEOUT must be positive"));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_lifetime)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 13637)),
            worker_threads: 1,
            cache_capacity: 10_000,
            cache_lifetime: 3600,
            about_url: None,
            upstream_base_url: DEFAULT_BASE_URL.to_string(),
            upstream_timeout: 10,
            output_base_url: DEFAULT_OUTPUT_BASE_URL.to_string(),
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(&format!("{name} has invalid value '{raw}'"))),
        None => Ok(default),
    }
}

fn invalid(message: &str) -> RedirectError {
    RedirectError::InvalidConfig(message.to_string())
}
