//! Unified error handling for admin.

use thiserror::Error;

use crate::config::ConfigError;
use crate::draft::DraftErrors;

/// Admin-level error type.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Product form did not validate.
    #[error("Validation error: {0}")]
    Validation(#[from] DraftErrors),

    /// File offered for upload is not an image.
    #[error("Only image files can be uploaded (got {0})")]
    InvalidImage(String),

    /// Local file could not be read.
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// Image upload was rejected by the backend.
    #[error("Image upload error: {status}")]
    Upload { status: u16, message: String },
}

impl AdminError {
    /// Text suitable for showing to an administrator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(e) if e.is_timeout() => "The server took too long to respond".to_string(),
            Self::Http(_) => "Could not reach the server".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Parse(_) => "Unexpected response from the server".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether the error points at a fault rather than an input mistake.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        match self {
            Self::Config(_) | Self::Http(_) | Self::Parse(_) => true,
            Self::Api { status, .. } | Self::Upload { status, .. } => *status >= 500,
            Self::NotFound(_) | Self::Validation(_) | Self::InvalidImage(_) | Self::Io(_) => false,
        }
    }

    /// Log the error and send unexpected ones to Sentry.
    pub fn report(&self) {
        if self.is_unexpected() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        } else {
            tracing::warn!(error = %self, "Admin request failed");
        }
    }
}

/// Result type alias for `AdminError`.
pub type Result<T> = std::result::Result<T, AdminError>;

/// Add a breadcrumb for admin actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
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
