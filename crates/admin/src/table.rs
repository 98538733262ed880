//! The admin product table: search, category filter and row display data.

use std::collections::BTreeSet;

use meatshop_core::{Product, ProductId};
use serde::Serialize;

/// Characters of the description shown under the product name.
const EXCERPT_CHARS: usize = 50;

/// Above this many units a product counts as well stocked.
const LOW_STOCK_LIMIT: i32 = 10;

/// Search and category selection applied to the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableQuery {
    /// Case-insensitive substring of name, article or description.
    pub search: Option<String>,
    /// Exact category; `None` shows every category.
    pub category: Option<String>,
}

impl TableQuery {
    /// Build a query from raw form values.
    ///
    /// A blank search and a blank or `all` category select everything.
    #[must_use]
    pub fn new(search: Option<&str>, category: Option<&str>) -> Self {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "all")
            .map(String::from);
        Self { search, category }
    }

    fn matches(&self, product: &Product) -> bool {
        if product.is_deleted() {
            return false;
        }
        if let Some(term) = &self.search {
            let hit = product.name.to_lowercase().contains(term)
                || product.article.to_lowercase().contains(term)
                || product
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(term));
            if !hit {
                return false;
            }
        }
        self.category
            .as_deref()
            .is_none_or(|category| product.category.as_deref() == Some(category))
    }
}

/// Quantity badge colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockClass {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockClass {
    #[must_use]
    pub const fn for_quantity(quantity: i32) -> Self {
        if quantity > LOW_STOCK_LIMIT {
            Self::InStock
        } else if quantity > 0 {
            Self::LowStock
        } else {
            Self::OutOfStock
        }
    }

    /// CSS class name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InStock => "in-stock",
            Self::LowStock => "low-stock",
            Self::OutOfStock => "out-of-stock",
        }
    }
}

/// Status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Unavailable,
}

impl Availability {
    #[must_use]
    pub const fn for_quantity(quantity: i32) -> Self {
        if quantity > 0 {
            Self::Available
        } else {
            Self::Unavailable
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "In stock",
            Self::Unavailable => "Out of stock",
        }
    }
}

/// One table row.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRow {
    pub id: ProductId,
    pub article: String,
    pub name: String,
    pub excerpt: Option<String>,
    pub category: String,
    /// What the customer pays.
    pub price: String,
    /// Base price, shown struck through during a sale.
    pub old_price: Option<String>,
    pub stock: String,
    pub stock_class: StockClass,
    pub availability: Availability,
    pub image_src: Option<String>,
}

impl ProductRow {
    fn new(product: &Product, uploads_path: &str) -> Self {
        let quantity = product.quantity.unwrap_or(0);
        let sale = product.active_sale_price();
        Self {
            id: product.id,
            article: product.article.clone(),
            name: product.name.clone(),
            excerpt: product
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(excerpt),
            category: product
                .category
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "Uncategorized".to_string()),
            price: sale.unwrap_or(product.price).to_string(),
            old_price: sale.map(|_| product.price.to_string()),
            stock: format!("{quantity} pcs."),
            stock_class: StockClass::for_quantity(quantity),
            availability: Availability::for_quantity(quantity),
            image_src: product
                .image_url
                .as_deref()
                .filter(|u| !u.is_empty())
                .map(|u| image_src(u, uploads_path)),
        }
    }
}

/// The first characters of a description, always followed by `...`.
#[must_use]
pub fn excerpt(description: &str) -> String {
    let head: String = description.chars().take(EXCERPT_CHARS).collect();
    format!("{head}...")
}

/// Where the table loads a product image from.
///
/// Absolute URLs are used as they are; anything else is taken as a stored
/// path and served by file name from `uploads_path`.
#[must_use]
pub fn image_src(image_url: &str, uploads_path: &str) -> String {
    if image_url.starts_with("http") {
        return image_url.to_string();
    }
    let file_name = image_url.rsplit('/').next().unwrap_or(image_url);
    format!("{}/{file_name}", uploads_path.trim_end_matches('/'))
}

/// Rows matching a query, with their count.
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub rows: Vec<ProductRow>,
    pub total_count: usize,
}

/// The full product list behind the admin table.
#[derive(Debug, Clone)]
pub struct ProductTable {
    products: Vec<Product>,
    uploads_path: String,
}

impl ProductTable {
    #[must_use]
    pub fn new(products: Vec<Product>, uploads_path: impl Into<String>) -> Self {
        Self {
            products,
            uploads_path: uploads_path.into(),
        }
    }

    /// Replace the product list after a refresh.
    pub fn replace(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    /// Rows for the non-deleted products matching `query`, in list order.
    #[must_use]
    pub fn view(&self, query: &TableQuery) -> TableView {
        let rows: Vec<ProductRow> = self
            .products
            .iter()
            .filter(|p| query.matches(p))
            .map(|p| ProductRow::new(p, &self.uploads_path))
            .collect();
        TableView {
            total_count: rows.len(),
            rows,
        }
    }

    /// Categories offered by the category filter, sorted.
    #[must_use]
    pub fn categories(&self) -> BTreeSet<&str> {
        self.products
            .iter()
            .filter(|p| !p.is_deleted())
            .filter_map(|p| p.category.as_deref())
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Find a product by id, deleted or not.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}
