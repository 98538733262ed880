//! Product catalog: the loaded product list, category filtering and cards.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::str::FromStr;
use std::sync::Arc;

use meatshop_core::{Product, ProductId};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::api::{ApiClient, ApiError};

/// Filter value meaning "every category".
const ALL_CATEGORIES: &str = "all";

/// Which products the catalog shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    /// `all` (any case) or a blank string selects every category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(ALL_CATEGORIES) {
            Ok(Self::All)
        } else {
            Ok(Self::Named(s.to_string()))
        }
    }
}

impl From<Option<String>> for CategoryFilter {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::All, |s| s.parse().unwrap_or_default())
    }
}

/// The product list the storefront is showing.
///
/// `find` looks only at the full list loaded by [`Catalog::load`], so a
/// product can be added to the cart whatever filter is active.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Arc<Vec<Product>>,
    displayed: Arc<Vec<Product>>,
    filter: CategoryFilter,
}

impl Catalog {
    /// Build a catalog from an already-fetched product list.
    #[must_use]
    pub fn from_products(products: Vec<Product>) -> Self {
        let products = Arc::new(products);
        Self {
            displayed: Arc::clone(&products),
            products,
            filter: CategoryFilter::All,
        }
    }

    /// Fetch every product.
    ///
    /// # Errors
    ///
    /// Returns error if the product list cannot be fetched.
    pub async fn load(client: &ApiClient) -> Result<Self, ApiError> {
        let products = client.get_products().await?;
        tracing::debug!(count = products.len(), "Catalog loaded");
        Ok(Self {
            displayed: Arc::clone(&products),
            products,
            filter: CategoryFilter::All,
        })
    }

    /// Switch the displayed products to `filter`.
    ///
    /// `All` shows the loaded list again without a request; a named category
    /// is fetched from the backend. On error the previous view is kept.
    ///
    /// # Errors
    ///
    /// Returns error if the category request fails.
    pub async fn filter(
        &mut self,
        client: &ApiClient,
        filter: CategoryFilter,
    ) -> Result<(), ApiError> {
        self.displayed = match &filter {
            CategoryFilter::All => Arc::clone(&self.products),
            CategoryFilter::Named(category) => client.get_products_by_category(category).await?,
        };
        self.filter = filter;
        Ok(())
    }

    /// The active filter.
    #[must_use]
    pub const fn current_filter(&self) -> &CategoryFilter {
        &self.filter
    }

    /// Displayed products that are not soft-deleted.
    pub fn visible(&self) -> impl Iterator<Item = &Product> {
        self.displayed.iter().filter(|p| !p.is_deleted())
    }

    /// Cards for the visible products.
    #[must_use]
    pub fn cards(&self) -> Vec<ProductCard> {
        self.visible().map(ProductCard::from).collect()
    }

    /// Find a loaded, non-deleted product by id.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.id == id && !p.is_deleted())
    }

    /// Distinct categories of the loaded products, sorted.
    #[must_use]
    pub fn categories(&self) -> BTreeSet<&str> {
        self.products
            .iter()
            .filter(|p| !p.is_deleted())
            .filter_map(|p| p.category.as_deref())
            .filter(|c| !c.trim().is_empty())
            .collect()
    }
}

// =============================================================================
// ProductCard
// =============================================================================

/// Display data for one product in the catalog grid.
#[derive(Debug, Clone, Serialize)]
pub struct ProductCard {
    pub id: ProductId,
    pub article: String,
    pub name: String,
    pub category: String,
    pub description: String,
    /// What the customer pays.
    pub price: String,
    /// Base price, shown struck through during a sale.
    pub old_price: Option<String>,
    pub on_sale: bool,
    pub discount_percent: u32,
    pub weight: String,
    pub stock: String,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        let on_sale = product.has_sale();
        Self {
            id: product.id,
            article: product.article.clone(),
            name: product.name.clone(),
            category: non_blank(product.category.as_deref())
                .unwrap_or("Uncategorized")
                .to_string(),
            description: non_blank(product.description.as_deref())
                .unwrap_or("No description")
                .to_string(),
            price: product.unit_price().to_string(),
            old_price: on_sale.then(|| product.price.to_string()),
            on_sale,
            discount_percent: product.discount_percent(),
            weight: weight_label(product.weight),
            stock: format!("{} pcs.", product.quantity.unwrap_or(0).max(0)),
            image_url: non_blank(product.image_url.as_deref()).map(String::from),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// `1,5 kg`, or a placeholder when the weight is unknown or zero.
#[must_use]
pub fn weight_label(weight: Option<Decimal>) -> String {
    match weight {
        Some(w) if !w.is_zero() => format!("{} kg", w.normalize().to_string().replace('.', ",")),
        _ => "Weight not specified".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(json: &str) -> Product {
        serde_json::from_str(json).unwrap()
    }

    fn sample() -> Vec<Product> {
        vec![
            product(r#"{"id": 1, "name": "Beef", "price": 1200, "salePrice": 999, "isOnSale": true, "category": "Beef", "weight": 1.50, "quantity": 4}"#),
            product(r#"{"id": 2, "name": "Pork", "price": 500, "category": "Pork"}"#),
            product(r#"{"id": 3, "name": "Old lamb", "price": 700, "category": "Lamb", "isDeleted": true}"#),
        ]
    }

    #[test]
    fn test_category_filter_parse() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("ALL".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(" ".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            " Beef ".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Named("Beef".to_string())
        );
        assert_eq!(CategoryFilter::from(None), CategoryFilter::All);
    }

    #[test]
    fn test_visible_hides_deleted() {
        let catalog = Catalog::from_products(sample());
        let ids: Vec<i64> = catalog.visible().map(|p| p.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(catalog.find(ProductId::new(3)).is_none());
        assert!(catalog.find(ProductId::new(2)).is_some());
    }

    #[test]
    fn test_categories() {
        let catalog = Catalog::from_products(sample());
        let categories: Vec<&str> = catalog.categories().into_iter().collect();
        assert_eq!(categories, vec!["Beef", "Pork"]);
    }

    #[test]
    fn test_card_for_sale_product() {
        let catalog = Catalog::from_products(sample());
        let card = &catalog.cards()[0];

        assert!(card.on_sale);
        assert_eq!(card.price, "999\u{a0}₽");
        assert_eq!(card.old_price.as_deref(), Some("1\u{a0}200\u{a0}₽"));
        assert_eq!(card.discount_percent, 17);
        assert_eq!(card.weight, "1,5 kg");
        assert_eq!(card.stock, "4 pcs.");
    }

    #[test]
    fn test_card_placeholders() {
        let card = ProductCard::from(&sample()[1]);
        assert!(!card.on_sale);
        assert!(card.old_price.is_none());
        assert_eq!(card.description, "No description");
        assert_eq!(card.weight, "Weight not specified");
        assert_eq!(card.stock, "0 pcs.");

        let card = ProductCard::from(&product(r#"{"id": 9, "name": "X", "price": 1, "category": ""}"#));
        assert_eq!(card.category, "Uncategorized");
    }

    #[test]
    fn test_weight_label() {
        assert_eq!(weight_label(Some(Decimal::new(2000, 3))), "2 kg");
        assert_eq!(weight_label(Some(Decimal::new(250, 3))), "0,25 kg");
        assert_eq!(weight_label(Some(Decimal::ZERO)), "Weight not specified");
        assert_eq!(weight_label(None), "Weight not specified");
    }
}
