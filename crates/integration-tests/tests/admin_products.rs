//! Admin product management against a mock backend.

#![allow(clippy::unwrap_used)]

use meatshop_admin::{
    AdminClient, AdminError, ImageFile, ProductDraft, ProductEditor, ProductTable, StockClass,
    TableQuery,
};
use meatshop_integration_tests::{LogLevels, admin_config, pid, product_json};
use mockito::Matcher;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::Level;

fn client(server_url: &str) -> AdminClient {
    AdminClient::new(&admin_config(server_url)).unwrap()
}

fn draft() -> ProductDraft {
    ProductDraft {
        article: " BEEF-010 ".to_string(),
        name: "Short ribs".to_string(),
        description: Some("Bone-in, for braising".to_string()),
        price: Decimal::from(1400),
        sale_price: Some(Decimal::from(1200)),
        is_on_sale: false,
        quantity: 8,
        category: Some("Beef".to_string()),
        image_url: Some("   ".to_string()),
        weight: Some(Decimal::new(12, 1)),
    }
}

fn image() -> ImageFile {
    ImageFile {
        file_name: "ribs.png".to_string(),
        bytes: b"PNGDATA".to_vec(),
        content_type: "image/png".to_string(),
    }
}

// ============================================================================
// CRUD
// ============================================================================

#[tokio::test]
async fn test_list_feeds_product_table() {
    let mut server = mockito::Server::new_async().await;
    let mut deleted = product_json(3, "Old brisket", 900.0);
    deleted["isDeleted"] = json!(true);
    let mut low = product_json(2, "Pork neck", 640.0);
    low["quantity"] = json!(4);
    low["category"] = json!("Pork");
    low["imageUrl"] = json!("/var/uploads/neck.png");
    server
        .mock("GET", "/api/products")
        .with_status(200)
        .with_body(json!([product_json(1, "Ribeye", 2500.0), low, deleted]).to_string())
        .create_async()
        .await;

    let products = client(&server.url()).list_products().await.unwrap();
    assert_eq!(products.len(), 3);

    let table = ProductTable::new(products, "/uploads");
    let view = table.view(&TableQuery::new(Some("NECK"), Some("all")));
    assert_eq!(view.total_count, 1);
    let row = view.rows.first().unwrap();
    assert_eq!(row.stock_class, StockClass::LowStock);
    assert_eq!(row.image_src.as_deref(), Some("/uploads/neck.png"));

    assert_eq!(table.view(&TableQuery::default()).total_count, 2);
}

#[tokio::test]
async fn test_create_rejection_uses_error_field() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/products")
        .with_status(409)
        .with_body(r#"{"success": false, "error": "Article BEEF-010 already exists"}"#)
        .create_async()
        .await;

    let err = client(&server.url())
        .create_product(&draft().normalized())
        .await
        .unwrap_err();
    assert!(matches!(&err, AdminError::Api { status: 409, .. }));
    assert_eq!(err.user_message(), "Article BEEF-010 already exists");
}

#[tokio::test]
async fn test_backend_failures_are_logged_as_warnings() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/products")
        .with_status(503)
        .create_async()
        .await;

    let (levels, _guard) = LogLevels::capture();
    let err = client(&server.url()).list_products().await.unwrap_err();

    assert!(err.is_unexpected());
    let recorded = levels.recorded();
    assert!(recorded.contains(&Level::WARN));
    assert!(!recorded.contains(&Level::ERROR));
}

#[tokio::test]
async fn test_delete_accepts_no_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/api/products/4")
        .with_status(204)
        .create_async()
        .await;

    client(&server.url()).delete_product(pid(4)).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_missing_product() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/api/products/404")
        .with_status(404)
        .with_body(r#"{"message": "Product not found: 404"}"#)
        .create_async()
        .await;

    let err = client(&server.url()).delete_product(pid(404)).await.unwrap_err();
    assert!(matches!(err, AdminError::NotFound(_)));
}

// ============================================================================
// Save flow
// ============================================================================

#[tokio::test]
async fn test_save_new_product_with_image() {
    let mut server = mockito::Server::new_async().await;

    let mut created = product_json(10, "Short ribs", 1400.0);
    created["article"] = json!("BEEF-010");
    let create = server
        .mock("POST", "/api/products")
        .match_body(Matcher::PartialJson(json!({
            "article": "BEEF-010",
            "price": 1400.0,
            "salePrice": null,
            "isOnSale": false,
            "imageUrl": null
        })))
        .with_status(201)
        .with_body(created.to_string())
        .create_async()
        .await;

    let upload = server
        .mock("POST", "/api/products/10/upload-image")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
        .match_body(Matcher::Regex(r#"name="file"; filename="ribs.png""#.to_string()))
        .with_status(200)
        .with_body(
            json!({
                "success": true,
                "message": "Image uploaded",
                "fileName": "ribs.png",
                "imageUrl": "http://localhost:8080/api/images/ribs.png",
                "filePath": "/var/uploads/ribs.png"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mut updated = created.clone();
    updated["imageUrl"] = json!("/var/uploads/ribs.png");
    let update = server
        .mock("PUT", "/api/products/10")
        .match_body(Matcher::PartialJson(json!({
            "article": "BEEF-010",
            "imageUrl": "/var/uploads/ribs.png"
        })))
        .with_status(200)
        .with_body(updated.to_string())
        .create_async()
        .await;

    let mut editor = ProductEditor::new();
    let saved = editor
        .save(&client(&server.url()), draft(), Some(image()))
        .await
        .unwrap();

    assert!(saved.created);
    assert_eq!(saved.message(), "Product added");
    assert_eq!(saved.product.image_url.as_deref(), Some("/var/uploads/ribs.png"));
    assert_eq!(saved.image.unwrap().file_name.as_deref(), Some("ribs.png"));
    assert_eq!(editor.current_id(), Some(pid(10)));

    create.assert_async().await;
    upload.assert_async().await;
    update.assert_async().await;
}

#[tokio::test]
async fn test_save_existing_product_updates() {
    let mut server = mockito::Server::new_async().await;
    let mut on_sale = draft();
    on_sale.is_on_sale = true;

    let mut body = product_json(7, "Short ribs", 1400.0);
    body["salePrice"] = json!(1200.0);
    body["isOnSale"] = json!(true);
    let update = server
        .mock("PUT", "/api/products/7")
        .match_body(Matcher::PartialJson(json!({
            "salePrice": 1200.0,
            "isOnSale": true
        })))
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;
    let create = server
        .mock("POST", "/api/products")
        .expect(0)
        .create_async()
        .await;

    let mut editor = ProductEditor::editing(pid(7));
    let saved = editor
        .save(&client(&server.url()), on_sale, None)
        .await
        .unwrap();

    assert!(!saved.created);
    assert_eq!(saved.message(), "Product updated");
    assert!(saved.image.is_none());
    update.assert_async().await;
    create.assert_async().await;
}

#[tokio::test]
async fn test_failed_upload_reports_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("PUT", "/api/products/5")
        .with_status(200)
        .with_body(product_json(5, "Short ribs", 1400.0).to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/api/products/5/upload-image")
        .with_status(400)
        .with_body(r#"{"success": false, "error": "Only images can be uploaded"}"#)
        .create_async()
        .await;

    let mut editor = ProductEditor::editing(pid(5));
    let err = editor
        .save(&client(&server.url()), draft(), Some(image()))
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::Upload { status: 400, .. }));
    assert_eq!(err.to_string(), "Image upload error: 400");
}

#[tokio::test]
async fn test_invalid_draft_sends_nothing() {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/api/products")
        .expect(0)
        .create_async()
        .await;

    let mut invalid = draft();
    invalid.price = Decimal::ZERO;
    invalid.article = "AB".to_string();

    let mut editor = ProductEditor::new();
    let err = editor
        .save(&client(&server.url()), invalid, None)
        .await
        .unwrap_err();

    let AdminError::Validation(errors) = err else {
        panic!("expected a validation error");
    };
    assert_eq!(errors.0.len(), 2);
    assert_eq!(editor.current_id(), None);
    create.assert_async().await;
}

#[tokio::test]
async fn test_non_image_upload_is_refused_locally() {
    let mut server = mockito::Server::new_async().await;
    let upload = server
        .mock("POST", "/api/products/5/upload-image")
        .expect(0)
        .create_async()
        .await;

    let err = client(&server.url())
        .upload_image(pid(5), "prices.pdf", b"%PDF".to_vec(), "application/pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::InvalidImage(_)));
    upload.assert_async().await;
}
