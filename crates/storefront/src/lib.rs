//! Meat Shop storefront library.
//!
//! Everything a shopper-facing front end needs on top of the shop backend:
//! the product [`catalog`], a [`cart`] persisted through a
//! [`storage::KeyValueStore`], and the [`checkout`] flow that turns the cart
//! into an order.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notice;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use cart::{Cart, CartItem, CartStore, CartView};
pub use catalog::{Catalog, CategoryFilter, ProductCard};
pub use checkout::{Checkout, CheckoutForm, CheckoutValidationError, OrderGateway, SubmitOutcome};
pub use config::StorefrontConfig;
pub use error::StorefrontError;
pub use notice::{Notice, NoticeLevel};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
