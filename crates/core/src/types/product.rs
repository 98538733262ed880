//! Product wire types.
//!
//! [`Product`] mirrors the backend's product representation. A
//! [`ProductSnapshot`] is the small subset copied into the cart when an item
//! is added, so the cart stays renderable without the catalog.

use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A catalog product as returned by `GET /api/products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub article: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub sale_price: Option<Price>,
    #[serde(default)]
    pub is_on_sale: Option<bool>,
    /// Units in stock.
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Weight in kilograms.
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub is_deleted: Option<bool>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Product {
    /// The sale price, if the product is flagged on sale and carries one.
    #[must_use]
    pub fn active_sale_price(&self) -> Option<Price> {
        if self.is_on_sale.unwrap_or(false) {
            self.sale_price
        } else {
            None
        }
    }

    /// Whether a sale price is currently in effect.
    #[must_use]
    pub fn has_sale(&self) -> bool {
        self.active_sale_price().is_some()
    }

    /// The price a customer pays for one unit.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.active_sale_price().unwrap_or(self.price)
    }

    /// Whether the product has been soft-deleted by an admin.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.is_deleted.unwrap_or(false)
    }

    /// Discount in whole percent.
    ///
    /// `(price - sale) / price` rounded half-up to two places, times 100.
    /// Zero when not on sale or when the base price is not positive.
    #[must_use]
    pub fn discount_percent(&self) -> u32 {
        let Some(sale) = self.active_sale_price() else {
            return 0;
        };
        let price = self.price.amount();
        if price <= Decimal::ZERO {
            return 0;
        }

        let ratio = ((price - sale.amount()) / price)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        (ratio * Decimal::ONE_HUNDRED).trunc().to_u32().unwrap_or(0)
    }

    /// The snapshot stored in the cart for this product.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot::from(self)
    }
}

/// The product fields a cart item carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Price>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_on_sale: bool,
}

/// Older carts stored the raw product, where `isOnSale` may be `null`.
fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Option::<bool>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ProductSnapshot {
    /// Create a snapshot with no sale price.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            sale_price: None,
            is_on_sale: false,
        }
    }

    /// Put the snapshot on sale at `sale_price`.
    #[must_use]
    pub const fn on_sale(mut self, sale_price: Price) -> Self {
        self.sale_price = Some(sale_price);
        self.is_on_sale = true;
        self
    }

    /// The price a customer pays for one unit.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        match self.sale_price {
            Some(sale) if self.is_on_sale => sale,
            _ => self.price,
        }
    }
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            sale_price: product.sale_price,
            is_on_sale: product.is_on_sale.unwrap_or(false),
        }
    }
}
