//! Meat Shop admin library.
//!
//! Product management on top of the shop backend: the [`client`] for the
//! product CRUD and image endpoints, the validated [`draft`] the product
//! form submits, the [`editor`] save flow and the product [`table`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod draft;
pub mod editor;
pub mod error;
pub mod table;

pub use client::{AdminClient, ImageUpload};
pub use config::AdminConfig;
pub use draft::{DraftError, DraftErrors, ProductDraft};
pub use editor::{ImageFile, ProductEditor, SavedProduct};
pub use error::AdminError;
pub use table::{Availability, ProductRow, ProductTable, StockClass, TableQuery, TableView};
