//! On-disk cart format.
//!
//! ```json
//! { "version": 1, "items": { "7": { "product": { ... }, "qty": 2 } } }
//! ```
//!
//! Data without a `version` field is the older unversioned layout, which has
//! the same shape and is read as version 1.

use std::collections::BTreeMap;

use meatshop_core::{ProductId, ProductSnapshot};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::{Cart, CartItem};

/// Schema version written by [`encode_cart`].
pub const CART_SCHEMA_VERSION: u64 = 1;

/// Why stored cart data could not be read.
#[derive(Debug, Error)]
pub enum CartDecodeError {
    /// The data is not JSON, or not shaped like a cart.
    #[error("Malformed cart data: {0}")]
    Malformed(String),

    /// The data was written by a newer or unknown schema.
    #[error("Unsupported cart schema version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Serialize)]
struct StoredCart<'a> {
    version: u64,
    items: BTreeMap<ProductId, StoredItem<'a>>,
}

#[derive(Serialize)]
struct StoredItem<'a> {
    product: &'a ProductSnapshot,
    qty: u32,
}

/// Serialize a cart in the current schema.
///
/// # Errors
///
/// Returns the serializer error, which does not happen for well-formed carts.
pub fn encode_cart(cart: &Cart) -> Result<String, serde_json::Error> {
    let stored = StoredCart {
        version: CART_SCHEMA_VERSION,
        items: cart
            .items
            .iter()
            .map(|(id, item)| {
                (
                    *id,
                    StoredItem {
                        product: &item.product,
                        qty: item.quantity,
                    },
                )
            })
            .collect(),
    };
    serde_json::to_string(&stored)
}

/// Parse stored cart data.
///
/// Individual entries that cannot be read are skipped. Entries with a
/// quantity of zero or less are dropped. A missing or non-numeric quantity
/// reads as 1.
///
/// # Errors
///
/// Returns `CartDecodeError` if the data is not a JSON object, has a
/// non-object `items` field, or declares a version other than 1.
pub fn decode_cart(raw: &str) -> Result<Cart, CartDecodeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| CartDecodeError::Malformed(e.to_string()))?;
    let Value::Object(root) = value else {
        return Err(CartDecodeError::Malformed(
            "expected a JSON object".to_string(),
        ));
    };

    match root.get("version") {
        None | Some(Value::Null) => {}
        Some(version) if version.as_u64() == Some(CART_SCHEMA_VERSION) => {}
        Some(version) => return Err(CartDecodeError::UnsupportedVersion(version.to_string())),
    }

    let mut cart = Cart::new();
    let items = match root.get("items") {
        None | Some(Value::Null) => return Ok(cart),
        Some(Value::Object(items)) => items,
        Some(_) => {
            return Err(CartDecodeError::Malformed(
                "`items` is not an object".to_string(),
            ));
        }
    };

    for (key, entry) in items {
        match decode_entry(key, entry) {
            Ok(Some(item)) => cart.insert(item),
            Ok(None) => {}
            Err(reason) => {
                tracing::warn!(key = %key, reason = %reason, "Skipping unreadable cart entry");
            }
        }
    }

    Ok(cart)
}

fn decode_entry(key: &str, entry: &Value) -> Result<Option<CartItem>, String> {
    let id: ProductId = key
        .parse()
        .map_err(|e| format!("invalid product id: {e}"))?;
    let Value::Object(fields) = entry else {
        return Err("entry is not an object".to_string());
    };
    let product: ProductSnapshot = fields
        .get("product")
        .cloned()
        .ok_or_else(|| "missing product".to_string())
        .and_then(|p| serde_json::from_value(p).map_err(|e| format!("invalid product: {e}")))?;
    if product.id != id {
        return Err(format!("product id {} does not match key", product.id));
    }

    Ok(stored_quantity(fields)
        .map(|qty| CartItem::new(product, qty)))
}

/// The stored quantity, or `None` when the entry should be dropped.
fn stored_quantity(fields: &Map<String, Value>) -> Option<u32> {
    let number = match fields.get("qty") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(number) = number.filter(|n| n.is_finite()) else {
        return Some(1);
    };

    let whole = number.trunc();
    if whole < 1.0 {
        return None;
    }
    Some(if whole >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked above
        let qty = whole as u32;
        qty
    })
}
