//! REST client for the shop backend.
//!
//! Uses `reqwest` 0.13 for HTTP. Product reads are cached with `moka`
//! (5-minute TTL by default); order creation is never cached.
//!
//! # Example
//!
//! ```rust,ignore
//! use meatshop_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config)?;
//! let products = client.get_products().await?;
//! let beef = client.get_products_by_category("Beef").await?;
//! ```

mod cache;

use std::sync::Arc;

use meatshop_core::{OrderPayload, OrderReceipt, Product, ProductId};
use moka::future::Cache;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;

use cache::{CacheKey, CacheValue};

/// Maximum number of cached product responses.
const CACHE_CAPACITY: u64 = 1000;

/// Longest slice of a response body included in logs.
const LOG_BODY_LIMIT: usize = 500;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Text suitable for showing to a shopper.
    ///
    /// For backend errors this is the backend's own `message`, or
    /// `HTTP error: <status>` when it sent none.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(e) if e.is_timeout() => "The server took too long to respond".to_string(),
            Self::Http(_) => "Could not reach the server".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Parse(_) => "Unexpected response from the server".to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
        }
    }

    /// Whether the error points at a fault rather than a user mistake.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::NotFound(_) => false,
        }
    }
}

/// The user-facing message for an error response.
///
/// Uses the body's `message` field when it is a non-empty string.
#[must_use]
pub fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
        })
        .unwrap_or_else(|| format!("HTTP error: {}", status.as_u16()))
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the shop backend's REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.catalog_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                cache,
            }),
        })
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api{path}",
            self.inner.base_url.as_str().trim_end_matches('/')
        )
    }

    /// Read a JSON body, mapping non-success statuses to [`ApiError::Api`].
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %truncate(&body),
                "Backend returned non-success status"
            );
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(
                error = %e,
                body = %truncate(&body),
                "Failed to parse backend response"
            );
            ApiError::Parse(e.to_string())
        })
    }

    // =========================================================================
    // Products (cached)
    // =========================================================================

    /// Get every product.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached_list(CacheKey::Products, self.endpoint("/products"))
            .await
    }

    /// Get the products of one category.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed.
    #[instrument(skip(self), fields(category = %category))]
    pub async fn get_products_by_category(
        &self,
        category: &str,
    ) -> Result<Arc<Vec<Product>>, ApiError> {
        let url = self.endpoint(&format!(
            "/products/category/{}",
            urlencoding::encode(category)
        ));
        self.cached_list(CacheKey::Category(category.to_string()), url)
            .await
    }

    async fn cached_list(&self, key: CacheKey, url: String) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!(?key, "Cache hit for product list");
            return Ok(products);
        }

        let response = self.inner.client.get(&url).send().await?;
        let products: Arc<Vec<Product>> = Arc::new(Self::read_json(response).await?);

        self.inner
            .cache
            .insert(key, CacheValue::Products(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` on a 404, or another error if the
    /// request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let response = self
            .inner
            .client
            .get(self.endpoint(&format!("/products/{id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("product {id}")));
        }
        let product: Product = Self::read_json(response).await?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Drop every cached product response.
    pub async fn invalidate_products(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    // =========================================================================
    // Orders (not cached)
    // =========================================================================

    /// Create an order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` with the backend's message on a non-success
    /// status, `ApiError::Http` on transport failure, or `ApiError::Parse`
    /// if a success response has no readable `id`.
    #[instrument(skip(self, payload), fields(items = payload.items.len()))]
    pub async fn create_order(&self, payload: &OrderPayload) -> Result<OrderReceipt, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/orders"))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;

        let receipt: OrderReceipt = Self::read_json(response).await?;
        debug!(order_id = %receipt.id, "Order created");
        Ok(receipt)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_uses_backend_message() {
        let msg = error_message(
            StatusCode::BAD_REQUEST,
            r#"{"timestamp":"2024-01-01T00:00:00","status":400,"error":"Bad Request","message":"Product not found: 99"}"#,
        );
        assert_eq!(msg, "Product not found: 99");
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>"),
            "HTTP error: 500"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, r#"{"message": "  "}"#),
            "HTTP error: 502"
        );
        assert_eq!(
            error_message(StatusCode::CONFLICT, r#"{"message": 12}"#),
            "HTTP error: 409"
        );
    }

    #[test]
    fn test_endpoint_joins_base_path() {
        let config =
            StorefrontConfig::with_api_url(Url::parse("https://shop.example.ru/backend").unwrap());
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("/orders"),
            "https://shop.example.ru/backend/api/orders"
        );

        let config = StorefrontConfig::with_api_url(Url::parse("http://localhost:8080").unwrap());
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.endpoint("/products"), "http://localhost:8080/api/products");
    }

    #[test]
    fn test_user_message_and_severity() {
        let err = ApiError::Api {
            status: 400,
            message: "Invalid phone".to_string(),
        };
        assert_eq!(err.user_message(), "Invalid phone");
        assert!(!err.is_unexpected());

        let err = ApiError::Api {
            status: 503,
            message: "HTTP error: 503".to_string(),
        };
        assert!(err.is_unexpected());

        let err = ApiError::Parse("expected value".to_string());
        assert_eq!(err.user_message(), "Unexpected response from the server");
        assert!(err.is_unexpected());
    }
}
