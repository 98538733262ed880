//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `MEATSHOP_API_URL` - Backend base URL (default: `http://localhost:8080`)
//! - `MEATSHOP_CART_DIR` - Directory holding the persisted cart (default: `.meatshop`)
//! - `MEATSHOP_CART_KEY` - Storage key of the cart (default: `cart_v1`)
//! - `MEATSHOP_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `MEATSHOP_CATALOG_TTL_SECS` - Product list cache lifetime in seconds (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_CART_DIR: &str = ".meatshop";
const DEFAULT_CART_KEY: &str = "cart_v1";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CATALOG_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend base URL, without the `/api` suffix
    pub api_url: Url,
    /// Directory the file-backed cart store writes into
    pub cart_dir: PathBuf,
    /// Key the cart is stored under
    pub cart_key: String,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
    /// How long product lists stay cached
    pub catalog_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
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
        let api_url = parse_api_url(
            "MEATSHOP_API_URL",
            &get_env_or_default(&lookup, "MEATSHOP_API_URL", DEFAULT_API_URL),
        )?;
        let cart_dir = PathBuf::from(get_env_or_default(
            &lookup,
            "MEATSHOP_CART_DIR",
            DEFAULT_CART_DIR,
        ));
        let cart_key = get_env_or_default(&lookup, "MEATSHOP_CART_KEY", DEFAULT_CART_KEY);
        if cart_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "MEATSHOP_CART_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let http_timeout = get_secs(
            &lookup,
            "MEATSHOP_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        let catalog_ttl = get_secs(&lookup, "MEATSHOP_CATALOG_TTL_SECS", DEFAULT_CATALOG_TTL_SECS)?;

        Ok(Self {
            api_url,
            cart_dir,
            cart_key,
            http_timeout,
            catalog_ttl,
            sentry_dsn: get_optional_env(&lookup, "SENTRY_DSN"),
            sentry_environment: get_optional_env(&lookup, "SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration with every default and the given backend URL.
    #[must_use]
    pub fn with_api_url(api_url: Url) -> Self {
        Self {
            api_url,
            cart_dir: PathBuf::from(DEFAULT_CART_DIR),
            cart_key: DEFAULT_CART_KEY.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            catalog_ttl: Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and check a backend base URL.
///
/// Only `http` and `https` are accepted. A trailing slash is stripped from the
/// path so that endpoint paths can be appended verbatim.
fn parse_api_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);
    Ok(url)
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Get a whole number of seconds. Zero is rejected.
fn get_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = get_optional_env(lookup, key) else {
        return Ok(Duration::from_secs(default));
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.cart_dir, PathBuf::from(".meatshop"));
        assert_eq!(config.cart_key, "cart_v1");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.catalog_ttl, Duration::from_secs(300));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("MEATSHOP_API_URL", "https://shop.example.ru/backend/"),
            ("MEATSHOP_CART_KEY", "cart_test"),
            ("MEATSHOP_HTTP_TIMEOUT_SECS", "5"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ])
        .unwrap();
        assert_eq!(config.api_url.as_str(), "https://shop.example.ru/backend");
        assert_eq!(config.cart_key, "cart_test");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert!(config.sentry_dsn.is_some());
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = load(&[("MEATSHOP_CART_DIR", "  "), ("SENTRY_DSN", "")]).unwrap();
        assert_eq!(config.cart_dir, PathBuf::from(".meatshop"));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("MEATSHOP_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "MEATSHOP_API_URL"));

        let err = load(&[("MEATSHOP_API_URL", "ftp://example.ru")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, msg) if msg.contains("ftp")));

        let err = load(&[("MEATSHOP_CATALOG_TTL_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = load(&[("MEATSHOP_HTTP_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_with_api_url_uses_defaults() {
        let url = Url::parse("http://127.0.0.1:9000").unwrap();
        let config = StorefrontConfig::with_api_url(url.clone());
        assert_eq!(config.api_url, url);
        assert_eq!(config.cart_key, "cart_v1");
        assert_eq!(config.catalog_ttl, Duration::from_secs(300));
    }
}
