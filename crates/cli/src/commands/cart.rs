//! Local cart commands.
//!
//! The cart lives in `MEATSHOP_CART_DIR` and survives between runs.
//!
//! # Usage
//!
//! ```bash
//! meatshop cart add 12 --qty 2
//! meatshop cart set 12 5
//! meatshop cart dec 12
//! meatshop cart show
//! ```

use meatshop_core::ProductId;
use meatshop_storefront::cart::parse_quantity;
use meatshop_storefront::{ApiClient, Cart, CartView, StorefrontConfig, StorefrontError};
use tracing::info;

use super::{CommandError, cart_store};

/// Log the cart contents and total.
pub fn show(config: &StorefrontConfig) {
    log_cart(&cart_store(config).get());
}

/// Fetch a product and add it to the cart.
pub async fn add(config: &StorefrontConfig, id: ProductId, qty: &str) -> Result<(), CommandError> {
    let client = ApiClient::new(config)?;
    let product = client.get_product(id).await?;
    if product.is_deleted() {
        return Err(StorefrontError::NotFound(format!("product {id}")).into());
    }

    let quantity = u32::try_from(parse_quantity(qty)).unwrap_or(u32::MAX);
    let cart = cart_store(config).add(product.snapshot(), quantity)?;
    info!("Added to cart: {}", product.name);
    log_cart(&cart);
    Ok(())
}

pub fn increment(config: &StorefrontConfig, id: ProductId) -> Result<(), CommandError> {
    let store = cart_store(config);
    require_item(&store.get(), id)?;
    log_cart(&store.increment(id)?);
    Ok(())
}

pub fn decrement(config: &StorefrontConfig, id: ProductId) -> Result<(), CommandError> {
    let store = cart_store(config);
    require_item(&store.get(), id)?;
    log_cart(&store.decrement(id)?);
    Ok(())
}

/// Set a quantity from raw input; anything unusable becomes one.
pub fn set(config: &StorefrontConfig, id: ProductId, value: &str) -> Result<(), CommandError> {
    let store = cart_store(config);
    require_item(&store.get(), id)?;
    log_cart(&store.set_quantity(id, parse_quantity(value))?);
    Ok(())
}

pub fn remove(config: &StorefrontConfig, id: ProductId) -> Result<(), CommandError> {
    let store = cart_store(config);
    require_item(&store.get(), id)?;
    let cart = store.remove(id)?;
    info!("Item removed from cart");
    log_cart(&cart);
    Ok(())
}

pub fn clear(config: &StorefrontConfig) -> Result<(), CommandError> {
    cart_store(config).clear()?;
    info!("Cart cleared");
    Ok(())
}

fn require_item(cart: &Cart, id: ProductId) -> Result<(), CommandError> {
    if cart.contains(id) {
        Ok(())
    } else {
        Err(StorefrontError::NotFound(format!("product {id} in the cart")).into())
    }
}

fn log_cart(cart: &Cart) {
    let view = CartView::from(cart);
    if view.is_empty {
        info!("Cart is empty");
        return;
    }

    for line in &view.lines {
        let price = line.original_price.as_ref().map_or_else(
            || line.unit_price.clone(),
            |old| format!("{} (was {old})", line.unit_price),
        );
        info!(
            "#{} {} | {} x {} = {}",
            line.product_id, line.name, price, line.quantity, line.line_total
        );
    }
    info!("Items: {} | Total: {}", view.badge_count, view.total);
}
