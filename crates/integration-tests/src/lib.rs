//! Integration tests for Meat Shop.
//!
//! Every test runs the real clients against a `mockito` server standing in
//! for the shop backend, so no running backend is required.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p meatshop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_api` - Product reads, caching and order creation
//! - `checkout_flow` - Cart to order, end to end
//! - `admin_products` - Product CRUD, image upload and the save flow

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Arc, Mutex, PoisonError};

use meatshop_admin::AdminConfig;
use meatshop_core::{Product, ProductId};
use meatshop_storefront::{CartStore, MemoryStore, StorefrontConfig};
use serde_json::{Value, json};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use url::Url;

/// Parse a mock server URL.
///
/// # Panics
///
/// Panics if `server_url` is not a valid URL.
#[must_use]
pub fn server_url(server_url: &str) -> Url {
    Url::parse(server_url).unwrap_or_else(|e| panic!("invalid mock server URL {server_url}: {e}"))
}

/// Storefront configuration pointing at a mock server.
#[must_use]
pub fn storefront_config(server: &str) -> StorefrontConfig {
    StorefrontConfig::with_api_url(server_url(server))
}

/// Admin configuration pointing at a mock server.
#[must_use]
pub fn admin_config(server: &str) -> AdminConfig {
    AdminConfig::with_api_url(server_url(server))
}

/// An empty cart kept in memory.
#[must_use]
pub fn memory_cart() -> CartStore {
    CartStore::new(Arc::new(MemoryStore::new()), "cart_v1")
}

/// Backend JSON for a product with the given base price.
#[must_use]
pub fn product_json(id: i64, name: &str, price: f64) -> Value {
    json!({
        "id": id,
        "article": format!("ART-{id:03}"),
        "name": name,
        "description": format!("{name}, chilled"),
        "price": price,
        "salePrice": null,
        "isOnSale": false,
        "quantity": 10,
        "category": "Beef",
        "imageUrl": null,
        "weight": 1.0,
        "isDeleted": false
    })
}

/// Backend JSON for a product on sale.
#[must_use]
pub fn sale_product_json(id: i64, name: &str, price: f64, sale_price: f64) -> Value {
    let mut value = product_json(id, name, price);
    value["salePrice"] = json!(sale_price);
    value["isOnSale"] = json!(true);
    value
}

/// Decode backend product JSON.
///
/// # Panics
///
/// Panics if `value` is not a valid product.
#[must_use]
pub fn product(value: &Value) -> Product {
    serde_json::from_value(value.clone())
        .unwrap_or_else(|e| panic!("invalid product fixture: {e}"))
}

/// Shorthand for a product id.
#[must_use]
pub const fn pid(id: i64) -> ProductId {
    ProductId::new(id)
}

// ============================================================================
// Log capture
// ============================================================================

/// Collects the levels of events logged by the meatshop crates.
#[derive(Debug, Clone, Default)]
pub struct LogLevels(Arc<Mutex<Vec<Level>>>);

impl LogLevels {
    /// Capture events on the current thread until the guard is dropped.
    ///
    /// Tests must run on the current-thread runtime, the `#[tokio::test]` default.
    #[must_use]
    pub fn capture() -> (Self, DefaultGuard) {
        let levels = Self::default();
        let guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(levels.clone()));
        (levels, guard)
    }

    /// Levels recorded so far, in order.
    #[must_use]
    pub fn recorded(&self) -> Vec<Level> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl<S: Subscriber> Layer<S> for LogLevels {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target().starts_with("meatshop") {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(*event.metadata().level());
        }
    }
}
