//! Subcommand implementations.

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod products;

use std::sync::Arc;

use meatshop_admin::AdminError;
use meatshop_storefront::{CartStore, FileStore, StorefrontConfig, StorefrontError};
use thiserror::Error;

/// Errors a command can end with.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    /// Draft file could not be read or parsed.
    #[error("Invalid draft file {path}: {reason}")]
    Draft { path: String, reason: String },

    /// The command ran but did not achieve its goal; already reported.
    #[error("{0}")]
    Rejected(String),
}

impl CommandError {
    /// Log the error, sending unexpected ones to Sentry.
    pub fn report(&self) {
        match self {
            Self::Storefront(e) => e.report(),
            Self::Admin(e) => e.report(),
            Self::Draft { .. } | Self::Rejected(_) => {
                tracing::error!("Command failed: {self}");
            }
        }
    }
}

impl From<meatshop_storefront::ApiError> for CommandError {
    fn from(e: meatshop_storefront::ApiError) -> Self {
        Self::Storefront(e.into())
    }
}

impl From<meatshop_storefront::StorageError> for CommandError {
    fn from(e: meatshop_storefront::StorageError) -> Self {
        Self::Storefront(e.into())
    }
}

/// The cart store in the configured directory.
pub fn cart_store(config: &StorefrontConfig) -> CartStore {
    CartStore::new(
        Arc::new(FileStore::new(config.cart_dir.clone())),
        config.cart_key.clone(),
    )
}
