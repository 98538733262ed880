//! Product form input and its validation.
//!
//! A [`ProductDraft`] is what the admin product form submits for both
//! create and update. [`ProductDraft::validate`] applies the backend's
//! constraints client side and reports every violation at once.

use core::fmt;

use meatshop_core::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ARTICLE_MIN: usize = 3;
const ARTICLE_MAX: usize = 50;
const NAME_MIN: usize = 2;
const NAME_MAX: usize = 255;
const DESCRIPTION_MAX: usize = 2000;
const CATEGORY_MAX: usize = 100;
const IMAGE_URL_MAX: usize = 500;

/// Smallest accepted price or sale price, in rubles.
const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Smallest accepted weight, in kilograms.
const MIN_WEIGHT: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Article is required")]
    ArticleBlank,
    #[error("Article must be 3 to 50 characters (got {0})")]
    ArticleLength(usize),
    #[error("Name is required")]
    NameBlank,
    #[error("Name must be 2 to 255 characters (got {0})")]
    NameLength(usize),
    #[error("Description must not exceed 2000 characters (got {0})")]
    DescriptionTooLong(usize),
    #[error("Price must be at least 0.01")]
    PriceTooLow,
    #[error("Sale price must be at least 0.01")]
    SalePriceTooLow,
    #[error("Quantity cannot be negative")]
    NegativeQuantity,
    #[error("Category must not exceed 100 characters (got {0})")]
    CategoryTooLong(usize),
    #[error("Image URL must not exceed 500 characters (got {0})")]
    ImageUrlTooLong(usize),
    #[error("Weight must be at least 0.001")]
    WeightTooLow,
}

/// Every violation found in a draft, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftErrors(pub Vec<DraftError>);

impl DraftErrors {
    /// Whether `error` is among the violations.
    #[must_use]
    pub fn contains(&self, error: &DraftError) -> bool {
        self.0.contains(error)
    }
}

impl fmt::Display for DraftErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DraftErrors {}

/// Product create/update body.
///
/// Prices and weight are sent as JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub article: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub is_on_sale: bool,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub weight: Option<Decimal>,
}

impl ProductDraft {
    /// Tidy the draft the way the admin form does before sending.
    ///
    /// Text fields are trimmed and blank optional fields become `None`.
    /// Without the sale flag the sale price is dropped.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.article = self.article.trim().to_string();
        self.name = self.name.trim().to_string();
        self.description = blank_to_none(self.description);
        self.category = blank_to_none(self.category);
        self.image_url = blank_to_none(self.image_url);
        if !self.is_on_sale {
            self.sale_price = None;
        }
        self
    }

    /// Check every constraint and collect the violations.
    ///
    /// # Errors
    ///
    /// Returns `DraftErrors` listing each violated constraint.
    pub fn validate(&self) -> Result<(), DraftErrors> {
        let mut errors = Vec::new();

        check_text(
            &self.article,
            ARTICLE_MIN..=ARTICLE_MAX,
            DraftError::ArticleBlank,
            DraftError::ArticleLength,
            &mut errors,
        );
        check_text(
            &self.name,
            NAME_MIN..=NAME_MAX,
            DraftError::NameBlank,
            DraftError::NameLength,
            &mut errors,
        );
        if let Some(len) = char_len_over(self.description.as_deref(), DESCRIPTION_MAX) {
            errors.push(DraftError::DescriptionTooLong(len));
        }
        if self.price < MIN_PRICE {
            errors.push(DraftError::PriceTooLow);
        }
        if self.sale_price.is_some_and(|p| p < MIN_PRICE) {
            errors.push(DraftError::SalePriceTooLow);
        }
        if self.quantity < 0 {
            errors.push(DraftError::NegativeQuantity);
        }
        if let Some(len) = char_len_over(self.category.as_deref(), CATEGORY_MAX) {
            errors.push(DraftError::CategoryTooLong(len));
        }
        if let Some(len) = char_len_over(self.image_url.as_deref(), IMAGE_URL_MAX) {
            errors.push(DraftError::ImageUrlTooLong(len));
        }
        if self.weight.is_some_and(|w| w < MIN_WEIGHT) {
            errors.push(DraftError::WeightTooLow);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DraftErrors(errors))
        }
    }

    /// Copy of this draft pointing at a new image.
    #[must_use]
    pub fn with_image_url(&self, image_url: impl Into<String>) -> Self {
        Self {
            image_url: Some(image_url.into()),
            ..self.clone()
        }
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            article: product.article.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.amount(),
            sale_price: product.sale_price.map(|p| p.amount()),
            is_on_sale: product.is_on_sale.unwrap_or(false),
            quantity: product.quantity.unwrap_or(0),
            category: product.category.clone(),
            image_url: product.image_url.clone(),
            weight: product.weight,
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_text(
    value: &str,
    bounds: core::ops::RangeInclusive<usize>,
    blank: DraftError,
    length: fn(usize) -> DraftError,
    errors: &mut Vec<DraftError>,
) {
    if value.trim().is_empty() {
        errors.push(blank);
    }
    let len = value.chars().count();
    if !bounds.contains(&len) {
        errors.push(length(len));
    }
}

fn char_len_over(value: Option<&str>, max: usize) -> Option<usize> {
    value.map(|v| v.chars().count()).filter(|len| *len > max)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid() -> ProductDraft {
        ProductDraft {
            article: "BEEF-001".to_string(),
            name: "Beef tenderloin".to_string(),
            description: Some("Chilled".to_string()),
            price: Decimal::new(120_050, 2),
            sale_price: None,
            is_on_sale: false,
            quantity: 10,
            category: Some("Beef".to_string()),
            image_url: None,
            weight: Some(Decimal::new(15, 1)),
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_article_rules() {
        let mut draft = valid();
        draft.article = "AB".to_string();
        assert_eq!(
            draft.validate().unwrap_err(),
            DraftErrors(vec![DraftError::ArticleLength(2)])
        );

        draft.article = "   ".to_string();
        assert!(draft.validate().unwrap_err().contains(&DraftError::ArticleBlank));

        draft.article = "A".repeat(51);
        assert!(draft.validate().unwrap_err().contains(&DraftError::ArticleLength(51)));
    }

    #[test]
    fn test_name_rules() {
        let mut draft = valid();
        draft.name = String::new();
        let errors = draft.validate().unwrap_err();
        assert!(errors.contains(&DraftError::NameBlank));
        assert!(errors.contains(&DraftError::NameLength(0)));

        draft.name = "Я".repeat(256);
        assert!(draft.validate().unwrap_err().contains(&DraftError::NameLength(256)));

        draft.name = "Я".repeat(255);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_numeric_rules() {
        let mut draft = valid();
        draft.price = Decimal::ZERO;
        draft.sale_price = Some(Decimal::new(5, 3));
        draft.quantity = -1;
        draft.weight = Some(Decimal::new(5, 4));

        let errors = draft.validate().unwrap_err();
        assert_eq!(
            errors,
            DraftErrors(vec![
                DraftError::PriceTooLow,
                DraftError::SalePriceTooLow,
                DraftError::NegativeQuantity,
                DraftError::WeightTooLow,
            ])
        );

        draft.price = Decimal::new(1, 2);
        draft.sale_price = Some(Decimal::new(1, 2));
        draft.quantity = 0;
        draft.weight = Some(Decimal::new(1, 3));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_length_limits() {
        let mut draft = valid();
        draft.description = Some("x".repeat(2001));
        draft.category = Some("c".repeat(101));
        draft.image_url = Some("u".repeat(501));

        let errors = draft.validate().unwrap_err();
        assert_eq!(
            errors,
            DraftErrors(vec![
                DraftError::DescriptionTooLong(2001),
                DraftError::CategoryTooLong(101),
                DraftError::ImageUrlTooLong(501),
            ])
        );
        assert!(errors.to_string().contains("; "));
    }

    #[test]
    fn test_normalized_drops_sale_price_without_flag() {
        let mut draft = valid();
        draft.sale_price = Some(Decimal::from(900));
        draft.category = Some("  ".to_string());
        draft.name = "  Beef  ".to_string();

        let draft = draft.normalized();
        assert_eq!(draft.sale_price, None);
        assert_eq!(draft.category, None);
        assert_eq!(draft.name, "Beef");

        let mut on_sale = valid();
        on_sale.is_on_sale = true;
        on_sale.sale_price = Some(Decimal::from(900));
        assert_eq!(on_sale.normalized().sale_price, Some(Decimal::from(900)));
    }

    #[test]
    fn test_serializes_numbers() {
        let value = serde_json::to_value(valid()).unwrap();
        assert_eq!(value["price"], serde_json::json!(1200.5));
        assert_eq!(value["weight"], serde_json::json!(1.5));
        assert_eq!(value["salePrice"], serde_json::Value::Null);
        assert_eq!(value["isOnSale"], false);
    }

    #[test]
    fn test_from_product() {
        let product: Product = serde_json::from_str(
            r#"{"id": 4, "article": "P-4", "name": "Pork", "price": 300, "salePrice": 250, "isOnSale": true, "quantity": 3}"#,
        )
        .unwrap();
        let draft = ProductDraft::from(&product);
        assert_eq!(draft.sale_price, Some(Decimal::from(250)));
        assert!(draft.is_on_sale);
        assert_eq!(draft.with_image_url("/uploads/p.jpg").image_url.as_deref(), Some("/uploads/p.jpg"));
    }
}
