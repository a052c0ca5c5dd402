//! Placed orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::cart::LineItem;
use crate::types::{Email, OrderId, OrderStatus, Price};

/// Shipping destination collected at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Payment reference attached to an order.
///
/// The client never processes payments; this is an opaque reference the
/// server records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    /// Payment method identifier (e.g., "card").
    pub method: String,
    /// Provider transaction reference, once the server records one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

/// Customer details embedded in admin order listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUser {
    pub name: String,
    #[serde(default)]
    pub email: Option<Email>,
}

/// An order as returned by the orders endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Server-assigned order ID.
    pub id: OrderId,
    /// Ordering customer; present only in admin listings.
    #[serde(default)]
    pub user: Option<OrderUser>,
    /// Line items captured at checkout time.
    pub items: Vec<LineItem>,
    /// Server-computed order total.
    pub total_amount: Price,
    /// Current fulfillment status.
    pub status: OrderStatus,
    /// Shipping destination.
    pub shipping_address: ShippingAddress,
    /// Payment reference, if the server exposes it.
    #[serde(default)]
    pub payment_info: Option<PaymentInfo>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_admin_listing_shape() {
        let order: Order = serde_json::from_str(
            r#"{
                "id": "o1",
                "user": {"name": "Ada"},
                "items": [],
                "totalAmount": 25.0,
                "status": "pending",
                "shippingAddress": {
                    "fullName": "Ada Lovelace",
                    "address": "1 Analytical Way",
                    "city": "London",
                    "postalCode": "N1",
                    "country": "UK"
                },
                "createdAt": "2026-08-01T12:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.user.unwrap().name, "Ada");
        assert!(order.payment_info.is_none());
    }

    #[test]
    fn test_serialize_camel_case() {
        let address = ShippingAddress {
            full_name: "Ada".into(),
            address: "1 Way".into(),
            city: "London".into(),
            postal_code: "N1".into(),
            country: "UK".into(),
        };
        let json = serde_json::to_string(&address).unwrap();
        assert!(json.contains("\"fullName\""));
        assert!(json.contains("\"postalCode\""));
    }
}
