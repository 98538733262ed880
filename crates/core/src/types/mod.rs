//! Core types for Meat Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod order;
pub mod phone;
pub mod price;
pub mod product;

pub use email::{Email, EmailError, is_valid_email};
pub use id::*;
pub use order::{OrderLine, OrderPayload, OrderReceipt};
pub use phone::{PhoneError, PhoneNumber, is_valid_phone, normalize_phone};
pub use price::Price;
pub use product::{Product, ProductSnapshot};
