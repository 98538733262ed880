//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! meatshop products list
//! meatshop products list --category Beef
//! meatshop products show 12
//! ```

use meatshop_core::ProductId;
use meatshop_storefront::{ApiClient, Catalog, CategoryFilter, ProductCard, StorefrontConfig};
use tracing::info;

use super::CommandError;

/// List the products of a category, or every product.
pub async fn list(config: &StorefrontConfig, category: Option<String>) -> Result<(), CommandError> {
    let client = ApiClient::new(config)?;
    let mut catalog = Catalog::load(&client).await?;

    let filter = CategoryFilter::from(category);
    catalog.filter(&client, filter).await?;

    let cards = catalog.cards();
    if cards.is_empty() {
        info!("No products found");
        return Ok(());
    }

    for card in &cards {
        log_card(card);
    }

    let categories: Vec<&str> = catalog.categories().into_iter().collect();
    info!(
        "{} products | categories: {}",
        cards.len(),
        categories.join(", ")
    );
    Ok(())
}

/// Show one product card.
pub async fn show(config: &StorefrontConfig, id: ProductId) -> Result<(), CommandError> {
    let client = ApiClient::new(config)?;
    let product = client.get_product(id).await?;
    if product.is_deleted() {
        return Err(CommandError::Rejected(format!("Product {id} is no longer sold")));
    }

    let card = ProductCard::from(&product);
    log_card(&card);
    info!("  {}", card.description);
    if let Some(url) = &card.image_url {
        info!("  Image: {url}");
    }
    Ok(())
}

fn log_card(card: &ProductCard) {
    let price = card.old_price.as_ref().map_or_else(
        || card.price.clone(),
        |old| format!("{} (was {old}, -{}%)", card.price, card.discount_percent),
    );
    info!(
        "#{} [{}] {} | {} | {} | {} | {}",
        card.id, card.article, card.name, card.category, price, card.weight, card.stock
    );
}
