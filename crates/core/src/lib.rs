//! Meat Shop Core - Shared types library.
//!
//! This crate provides common types used across all Meat Shop components:
//! - `storefront` - Catalog, local cart and checkout
//! - `admin` - Product management client
//! - `cli` - Command-line front end driving both
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, phone numbers,
//!   and the product and order wire types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
