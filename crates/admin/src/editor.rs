//! The product form's save flow.
//!
//! [`ProductEditor`] remembers which product the form is editing. Saving
//! creates the product when there is none yet and updates it otherwise,
//! then attaches an image if one was chosen.

use std::path::Path;

use meatshop_core::{Product, ProductId};
use tracing::instrument;

use crate::client::{AdminClient, ImageUpload};
use crate::draft::ProductDraft;
use crate::error::{AdminError, add_breadcrumb};

/// An image chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImageFile {
    /// Read an image from disk, guessing its content type from the
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Io` if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self, AdminError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self {
            content_type: content_type_for(&file_name).to_string(),
            file_name,
            bytes,
        })
    }
}

/// Content type for a file name, by extension.
#[must_use]
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// What a save did.
#[derive(Debug, Clone)]
pub struct SavedProduct {
    pub product: Product,
    /// `true` when the product was created rather than updated.
    pub created: bool,
    pub image: Option<ImageUpload>,
}

impl SavedProduct {
    /// Confirmation shown after the save.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        if self.created {
            "Product added"
        } else {
            "Product updated"
        }
    }
}

/// Create-or-update state of the product form.
#[derive(Debug, Clone, Default)]
pub struct ProductEditor {
    current_id: Option<ProductId>,
}

impl ProductEditor {
    /// An editor for a new product.
    #[must_use]
    pub const fn new() -> Self {
        Self { current_id: None }
    }

    /// An editor for an existing product.
    #[must_use]
    pub const fn editing(id: ProductId) -> Self {
        Self {
            current_id: Some(id),
        }
    }

    /// The product being edited, once it exists.
    #[must_use]
    pub const fn current_id(&self) -> Option<ProductId> {
        self.current_id
    }

    /// Validate and save the draft, then upload `image` if given.
    ///
    /// After a create the editor switches to editing the new product, so
    /// a failed image upload can be retried with another save.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` without sending anything if the
    /// draft is invalid, `AdminError::Upload` if the image is refused, or
    /// the error of whichever request failed.
    #[instrument(skip(self, client, draft, image), fields(product_id = ?self.current_id))]
    pub async fn save(
        &mut self,
        client: &AdminClient,
        draft: ProductDraft,
        image: Option<ImageFile>,
    ) -> Result<SavedProduct, AdminError> {
        let draft = draft.normalized();
        draft.validate()?;

        let (mut product, created) = match self.current_id {
            Some(id) => (client.update_product(id, &draft).await?, false),
            None => {
                let product = client.create_product(&draft).await?;
                self.current_id = Some(product.id);
                (product, true)
            }
        };
        add_breadcrumb(
            "admin",
            if created { "Product created" } else { "Product updated" },
            Some(&[("product_id", product.id.to_string().as_str())]),
        );

        let Some(image) = image else {
            return Ok(SavedProduct {
                product,
                created,
                image: None,
            });
        };

        let upload = client
            .upload_image(product.id, &image.file_name, image.bytes, &image.content_type)
            .await?;
        if !upload.file_path.is_empty() {
            product = client
                .update_product(product.id, &draft.with_image_url(upload.file_path.as_str()))
                .await?;
        }
        add_breadcrumb(
            "admin",
            "Product image uploaded",
            Some(&[("file_path", upload.file_path.as_str())]),
        );

        Ok(SavedProduct {
            product,
            created,
            image: Some(upload),
        })
    }
}
