//! Cache types for backend API responses.

use std::sync::Arc;

use meatshop_core::{Product, ProductId};

/// Cache key for product reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Category(String),
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
}
