//! Client configuration loaded from environment variables.
//!
//! All settings have defaults so the client can start against a local
//! backend with zero configuration.

use std::path::PathBuf;
use std::time::Duration;

use tastybites_shared::constants::DEFAULT_API_URL;
use tastybites_store::{Database, StoreError};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, including the `/api` prefix.
    /// Env: `TASTYBITES_API_URL`
    /// Default: `http://127.0.0.1:8000/api`
    pub api_url: String,

    /// Whole-request timeout. `None` keeps the transport default.
    /// Env: `TASTYBITES_HTTP_TIMEOUT_SECS`
    pub http_timeout: Option<Duration>,

    /// SQLite file holding the session.
    /// Env: `TASTYBITES_DB_PATH`
    /// Default: the platform data directory, see [`Database::default_path`].
    pub db_path: Option<PathBuf>,

    /// Capacity of the client event channel.
    pub event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout: None,
            db_path: None,
            event_capacity: 64,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("TASTYBITES_API_URL") {
            match normalize_api_url(&url) {
                Some(url) => config.api_url = url,
                None => tracing::warn!(value = %url, "Invalid TASTYBITES_API_URL, using default"),
            }
        }

        if let Ok(val) = std::env::var("TASTYBITES_HTTP_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(0) => config.http_timeout = None,
                Ok(secs) => config.http_timeout = Some(Duration::from_secs(secs)),
                Err(_) => tracing::warn!(
                    value = %val,
                    "Invalid TASTYBITES_HTTP_TIMEOUT_SECS, using transport default"
                ),
            }
        }

        if let Ok(path) = std::env::var("TASTYBITES_DB_PATH") {
            if !path.trim().is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        config
    }

    /// Where the session database lives.
    pub fn resolve_db_path(&self) -> Result<PathBuf, StoreError> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => Database::default_path(),
        }
    }
}

/// Trim whitespace and trailing slashes; reject anything that is not http(s).
fn normalize_api_url(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        Some(url.to_string())
    } else {
        None
    }
}
