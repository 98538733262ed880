//! Order wire types for `POST /api/orders`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::{OrderId, ProductId};
use super::phone::PhoneNumber;

/// Request body for creating an order.
///
/// Contact fields are the validated `Email` and normalized `PhoneNumber`
/// types, so the backend's own validation sees canonical values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub name: String,
    pub email: Email,
    pub phone_number: PhoneNumber,
    pub items: Vec<OrderLine>,
}

/// One line of an order, snapshotted from the cart at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub qty: u32,
    /// Unit price, sent as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Successful response from `POST /api/orders`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OrderReceipt {
    pub id: OrderId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_payload_wire_shape() {
        let payload = OrderPayload {
            name: "Ivan".to_string(),
            email: Email::parse("ivan@example.ru").unwrap(),
            phone_number: PhoneNumber::parse("89123456789").unwrap(),
            items: vec![OrderLine {
                product_id: ProductId::new(5),
                name: "Beef".to_string(),
                qty: 2,
                price: Decimal::new(4050, 2),
            }],
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Ivan",
                "email": "ivan@example.ru",
                "phoneNumber": "+79123456789",
                "items": [{"productId": 5, "name": "Beef", "qty": 2, "price": 40.5}]
            })
        );
    }

    #[test]
    fn test_receipt_ignores_extra_fields() {
        let receipt: OrderReceipt =
            serde_json::from_str(r#"{"id": 17, "status": "NEW"}"#).unwrap();
        assert_eq!(receipt.id, OrderId::new(17));
    }
}
