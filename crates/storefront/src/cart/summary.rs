//! Cart totals and the cart view model.

use meatshop_core::{Price, ProductId};
use serde::Serialize;

use super::{Cart, CartItem};

/// Sum of unit price times quantity over every item.
#[must_use]
pub fn total(cart: &Cart) -> Price {
    cart.items().map(CartItem::line_total).sum()
}

/// Number of distinct products. This is what the cart badge shows.
#[must_use]
pub fn item_count(cart: &Cart) -> usize {
    cart.len()
}

/// Total units across all products.
#[must_use]
pub fn unit_count(cart: &Cart) -> u64 {
    cart.items().map(|item| u64::from(item.quantity())).sum()
}

/// Cart display data for templates or terminal output.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub badge_count: usize,
    pub badge_visible: bool,
    pub is_empty: bool,
}

/// A single line in the cart view.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: String,
    /// Base price, shown struck through when a sale applies.
    pub original_price: Option<String>,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        let product = item.product();
        let unit_price = item.unit_price();
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: unit_price.to_string(),
            original_price: (unit_price != product.price).then(|| product.price.to_string()),
            quantity: item.quantity(),
            line_total: item.line_total().to_string(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let badge_count = item_count(cart);
        Self {
            lines: cart.items().map(CartLineView::from).collect(),
            total: total(cart).to_string(),
            badge_count,
            badge_visible: badge_count > 0,
            is_empty: cart.is_empty(),
        }
    }
}
