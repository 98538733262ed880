//! Product management commands.
//!
//! # Usage
//!
//! ```bash
//! meatshop admin list --search rib --category Beef
//! meatshop admin create --file ribeye.yaml --image ribeye.jpg
//! meatshop admin update 12 --file ribeye.yaml
//! meatshop admin delete 12
//! ```
//!
//! Draft files are YAML (or JSON) with the product form's fields:
//!
//! ```yaml
//! article: BEEF-001
//! name: Ribeye
//! price: 2500
//! isOnSale: true
//! salePrice: 2100
//! quantity: 12
//! category: Beef
//! weight: 0.35
//! ```

use std::path::Path;

use meatshop_admin::{
    AdminClient, AdminConfig, ImageFile, ProductDraft, ProductEditor, ProductTable, TableQuery,
};
use meatshop_core::ProductId;
use tracing::info;

use super::CommandError;

/// Admin client plus the settings the product table needs.
pub struct Admin {
    client: AdminClient,
    config: AdminConfig,
}

impl Admin {
    /// Load admin configuration and build the client.
    pub fn from_env() -> Result<Self, CommandError> {
        let config = AdminConfig::from_env().map_err(meatshop_admin::AdminError::from)?;
        let client = AdminClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// Log the product table for a search and category.
    pub async fn list(
        &self,
        search: Option<&str>,
        category: Option<&str>,
    ) -> Result<(), CommandError> {
        let products = self.client.list_products().await?;
        let table = ProductTable::new(products, self.config.uploads_path.as_str());
        let view = table.view(&TableQuery::new(search, category));

        if view.rows.is_empty() {
            info!("No products found");
        }
        for row in &view.rows {
            let price = row.old_price.as_ref().map_or_else(
                || row.price.clone(),
                |old| format!("{} (was {old})", row.price),
            );
            info!(
                "#{} [{}] {} | {} | {} | {} ({}) | {}",
                row.id,
                row.article,
                row.name,
                row.category,
                price,
                row.stock,
                row.stock_class.as_str(),
                row.availability.label()
            );
            if let Some(excerpt) = &row.excerpt {
                info!("    {excerpt}");
            }
            if let Some(src) = &row.image_src {
                info!("    Image: {src}");
            }
        }
        info!("{} products", view.total_count);
        Ok(())
    }

    /// Log every field of one product.
    pub async fn show(&self, id: ProductId) -> Result<(), CommandError> {
        let product = self.client.get_product(id).await?;
        let draft = ProductDraft::from(&product);
        let yaml = serde_yaml::to_string(&draft).map_err(|e| CommandError::Draft {
            path: format!("product {id}"),
            reason: e.to_string(),
        })?;

        info!(
            "#{} {}{}",
            product.id,
            product.name,
            if product.is_deleted() { " (deleted)" } else { "" }
        );
        for line in yaml.lines() {
            info!("  {line}");
        }
        Ok(())
    }

    /// Create (`id` is `None`) or update a product from a draft file, then
    /// upload an image if one is given.
    pub async fn save(
        &self,
        id: Option<ProductId>,
        file: &Path,
        image: Option<&Path>,
    ) -> Result<(), CommandError> {
        let draft = read_draft(file).await?;
        let image = match image {
            Some(path) => Some(ImageFile::from_path(path).await?),
            None => None,
        };

        let mut editor = id.map_or_else(ProductEditor::new, ProductEditor::editing);
        let saved = editor.save(&self.client, draft, image).await?;

        info!("{}: #{} {}", saved.message(), saved.product.id, saved.product.name);
        if let Some(upload) = &saved.image {
            info!("Image uploaded: {}", upload.file_path);
        }
        Ok(())
    }

    pub async fn delete(&self, id: ProductId) -> Result<(), CommandError> {
        self.client.delete_product(id).await?;
        info!("Product #{id} deleted");
        Ok(())
    }
}

/// Read a product draft from a YAML or JSON file.
async fn read_draft(path: &Path) -> Result<ProductDraft, CommandError> {
    let draft_error = |reason: String| CommandError::Draft {
        path: path.display().to_string(),
        reason,
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| draft_error(e.to_string()))?;
    serde_yaml::from_str(&content).map_err(|e| draft_error(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[tokio::test]
    async fn test_read_yaml_draft() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ribeye.yaml");
        std::fs::write(
            &path,
            "article: BEEF-001\nname: Ribeye\nprice: 2500.50\nisOnSale: true\nsalePrice: 2100\nquantity: 12\nweight: 0.35\n",
        )
        .unwrap();

        let draft = read_draft(&path).await.unwrap();
        assert_eq!(draft.article, "BEEF-001");
        assert_eq!(draft.price, Decimal::new(250_050, 2));
        assert_eq!(draft.sale_price, Some(Decimal::from(2100)));
        assert_eq!(draft.weight, Some(Decimal::new(35, 2)));
        assert!(draft.description.is_none());
    }

    #[tokio::test]
    async fn test_read_json_draft() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pork.json");
        std::fs::write(&path, r#"{"article": "PORK-1", "name": "Neck", "price": 640}"#).unwrap();

        let draft = read_draft(&path).await.unwrap();
        assert_eq!(draft.name, "Neck");
        assert_eq!(draft.quantity, 0);
    }

    #[tokio::test]
    async fn test_read_draft_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "name: [unclosed").unwrap();

        let err = read_draft(&path).await.unwrap_err();
        assert!(matches!(err, CommandError::Draft { path: p, .. } if p.ends_with("broken.yaml")));
    }
}
