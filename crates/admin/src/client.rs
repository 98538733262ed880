//! REST client for the backend's product management endpoints.
//!
//! Admin reads are never cached: the product table always reflects the
//! backend after a create, update or delete.
//!
//! # Example
//!
//! ```rust,ignore
//! use meatshop_admin::AdminClient;
//!
//! let client = AdminClient::new(&config)?;
//! let products = client.list_products().await?;
//! client.delete_product(products[0].id).await?;
//! ```

use std::sync::Arc;

use meatshop_core::{Product, ProductId};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::AdminConfig;
use crate::draft::ProductDraft;
use crate::error::AdminError;

/// Longest slice of a response body included in logs.
const LOG_BODY_LIMIT: usize = 500;

/// Multipart field the upload endpoint reads the file from.
const UPLOAD_FIELD: &str = "file";

/// Result of a successful image upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Stored path the product's `imageUrl` should point at.
    pub file_path: String,
}

/// Body of an upload the backend refused with a 2xx status.
#[derive(Debug, Deserialize)]
struct UploadFailure {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// The user-facing message for an error response.
///
/// Prefers the body's `message` field, then its `error` field, falling back
/// to `HTTP error: <status>`.
#[must_use]
pub fn error_message(status: StatusCode, body: &str) -> String {
    let value = serde_json::from_str::<serde_json::Value>(body).ok();
    let field = |name: &str| {
        value
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from)
    };

    field("message")
        .or_else(|| field("error"))
        .unwrap_or_else(|| format!("HTTP error: {}", status.as_u16()))
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}

// =============================================================================
// AdminClient
// =============================================================================

/// Client for product management.
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl AdminClient {
    /// Create a new admin client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &AdminConfig) -> Result<Self, AdminError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                base_url: config.api_url.clone(),
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api{path}",
            self.inner.base_url.as_str().trim_end_matches('/')
        )
    }

    /// Read the body of a response, mapping non-success statuses to
    /// [`AdminError::Api`].
    async fn read_body(response: reqwest::Response) -> Result<String, AdminError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %truncate(&body),
                "Backend returned non-success status"
            );
            return Err(AdminError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        Ok(body)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AdminError> {
        let body = Self::read_body(response).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(
                error = %e,
                body = %truncate(&body),
                "Failed to parse backend response"
            );
            AdminError::Parse(e.to_string())
        })
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Get every product, including soft-deleted ones.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, AdminError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("/products"))
            .send()
            .await?;
        let products: Vec<Product> = Self::read_json(response).await?;
        debug!(count = products.len(), "Products listed");
        Ok(products)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` on a 404, or another error if the
    /// request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, AdminError> {
        let response = self
            .inner
            .client
            .get(self.endpoint(&format!("/products/{id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AdminError::NotFound(format!("product {id}")));
        }
        Self::read_json(response).await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Api` with the backend's message when it rejects
    /// the draft.
    #[instrument(skip(self, draft), fields(article = %draft.article))]
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product, AdminError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("/products"))
            .json(draft)
            .send()
            .await?;
        let product: Product = Self::read_json(response).await?;
        debug!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Replace a product's fields with the draft.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` on a 404, or `AdminError::Api` with
    /// the backend's message when it rejects the draft.
    #[instrument(skip(self, draft), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, AdminError> {
        let response = self
            .inner
            .client
            .put(self.endpoint(&format!("/products/{id}")))
            .json(draft)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AdminError::NotFound(format!("product {id}")));
        }
        let product: Product = Self::read_json(response).await?;
        debug!("Product updated");
        Ok(product)
    }

    /// Soft-delete a product.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` on a 404, or `AdminError::Api` for any
    /// other non-success status.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), AdminError> {
        let response = self
            .inner
            .client
            .delete(self.endpoint(&format!("/products/{id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AdminError::NotFound(format!("product {id}")));
        }
        Self::read_body(response).await?;
        debug!("Product deleted");
        Ok(())
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// Upload an image for a product.
    ///
    /// Only `image/*` content types are sent; anything else is rejected
    /// before a request is made.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidImage` for a non-image content type, or
    /// `AdminError::Upload` when the backend refuses the file.
    #[instrument(skip(self, bytes), fields(product_id = %id, size = bytes.len()))]
    pub async fn upload_image(
        &self,
        id: ProductId,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<ImageUpload, AdminError> {
        if !content_type.starts_with("image/") {
            return Err(AdminError::InvalidImage(content_type.to_string()));
        }

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|_| AdminError::InvalidImage(content_type.to_string()))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .inner
            .client
            .post(self.endpoint(&format!("/products/{id}/upload-image")))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %truncate(&body),
                "Image upload rejected"
            );
            return Err(AdminError::Upload {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        if let Ok(failure) = serde_json::from_str::<UploadFailure>(&body)
            && !failure.success
        {
            return Err(AdminError::Upload {
                status: status.as_u16(),
                message: failure
                    .error
                    .unwrap_or_else(|| error_message(status, &body)),
            });
        }

        let upload: ImageUpload = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(
                error = %e,
                body = %truncate(&body),
                "Failed to parse upload response"
            );
            AdminError::Parse(e.to_string())
        })?;
        debug!(file_path = %upload.file_path, "Image uploaded");
        Ok(upload)
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_message_then_error() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message": "Article taken", "error": "Bad Request"}"#),
            "Article taken"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"success": false, "error": "Images only"}"#),
            "Images only"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "HTTP error: 500"
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_non_image_before_sending() {
        let config = AdminConfig::with_api_url(Url::parse("http://127.0.0.1:9").unwrap());
        let client = AdminClient::new(&config).unwrap();

        let err = client
            .upload_image(ProductId::new(1), "notes.txt", b"hi".to_vec(), "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::InvalidImage(ct) if ct == "text/plain"));
    }

    #[test]
    fn test_endpoint() {
        let config = AdminConfig::with_api_url(Url::parse("http://localhost:8080/").unwrap());
        let client = AdminClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("/products/3/upload-image"),
            "http://localhost:8080/api/products/3/upload-image"
        );
    }
}
