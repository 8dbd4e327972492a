//! API endpoint configuration.
//!
//! Resolution: `TIX_API_URL` env var, else the local development default.
//! The value is normalized (trimmed, no trailing slash) so endpoint
//! concatenation stays predictable.

use serde::Serialize;
use std::env;

/// Default backend address when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// Environment variable holding the backend base URL.
pub const BASE_URL_ENV: &str = "TIX_API_URL";

/// Resolved backend location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ApiConfig {
    /// Resolve from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::resolve(env::var(BASE_URL_ENV).ok().as_deref())
    }

    /// Explicit base URL (CLI flag override).
    #[must_use]
    pub fn with_base_url(raw: &str) -> Self {
        Self::resolve(Some(raw))
    }

    /// Core resolution, separated for tests.
    fn resolve(raw: Option<&str>) -> Self {
        let cleaned = raw
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_BASE_URL);
        Self {
            base_url: cleaned.trim_end_matches('/').to_string(),
        }
    }

    /// Join a path (starting with `/`) onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
