//! Unified error handling with Sentry integration.
//!
//! [`StorefrontError`] wraps the error of every storefront integration so
//! callers can propagate any of them with `?`.

use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutValidationError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Storefront-level error type.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Cart storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Checkout form or cart did not validate.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutValidationError),

    /// Requested product is unknown.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl StorefrontError {
    /// Text suitable for showing to a shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Checkout(err) => err.to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::Config(_) | Self::Storage(_) => self.to_string(),
        }
    }

    /// Log the error and send unexpected ones to Sentry.
    ///
    /// User mistakes (validation, unknown products) are logged at `warn` only.
    pub fn report(&self) {
        if matches!(self, Self::Storage(_) | Self::Config(_))
            || matches!(self, Self::Api(err) if err.is_unexpected())
        {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::warn!(error = %self, "Storefront request failed");
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
