//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `MEATSHOP_API_URL` - Backend base URL (default: `http://localhost:8080`)
//! - `MEATSHOP_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `MEATSHOP_UPLOADS_PATH` - Path uploaded images are served from (default: `/uploads`)

use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_UPLOADS_PATH: &str = "/uploads";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Backend base URL, without the `/api` suffix
    pub api_url: Url,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
    /// URL path prefix for uploaded product images
    pub uploads_path: String,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_url = get("MEATSHOP_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(raw_url.trim()).map_err(|e| {
            ConfigError::InvalidEnvVar("MEATSHOP_API_URL".to_string(), e.to_string())
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "MEATSHOP_API_URL".to_string(),
                format!("unsupported scheme '{}'", api_url.scheme()),
            ));
        }

        let http_timeout = match get("MEATSHOP_HTTP_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "MEATSHOP_HTTP_TIMEOUT_SECS".to_string(),
                        format!("expected a positive whole number of seconds, got '{raw}'"),
                    )
                })?,
        };

        let uploads_path = get("MEATSHOP_UPLOADS_PATH")
            .map_or_else(|| DEFAULT_UPLOADS_PATH.to_string(), |p| {
                format!("/{}", p.trim().trim_matches('/'))
            });

        Ok(Self {
            api_url,
            http_timeout,
            uploads_path,
        })
    }

    /// Configuration with every default and the given backend URL.
    #[must_use]
    pub fn with_api_url(api_url: Url) -> Self {
        Self {
            api_url,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            uploads_path: DEFAULT_UPLOADS_PATH.to_string(),
        }
    }
}
