//! Catalog products.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// The product snapshot the server embeds in cart line items.
///
/// This is an opaque copy of server state: the client never computes or
/// caches prices independently of the last response that carried them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    /// Server-assigned product ID.
    pub id: ProductId,
    /// Product display name.
    pub name: String,
    /// Unit price at the time the server produced this snapshot.
    pub price: Price,
    /// Product image URL.
    pub image: String,
}

/// A full catalog product as returned by the products endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned product ID.
    pub id: ProductId,
    /// Product display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Product image URL.
    pub image: String,
    /// Catalog category (e.g., "Electronics", "Books").
    pub category: String,
    /// Units in stock.
    pub stock: u32,
}

impl Product {
    /// The cart-embedded snapshot of this product.
    #[must_use]
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_product() {
        let product: Product = serde_json::from_str(
            r#"{
                "id": "p1",
                "name": "Headphones",
                "description": "Over-ear",
                "price": 59.5,
                "image": "https://img.example.com/p1.jpg",
                "category": "Electronics",
                "stock": 12
            }"#,
        )
        .unwrap();
        assert_eq!(product.stock, 12);
        assert_eq!(product.price, Price::from_cents(5950));
    }

    #[test]
    fn test_summary_copies_price() {
        let product = Product {
            id: ProductId::new("p1"),
            name: "Mug".into(),
            description: "Ceramic".into(),
            price: Price::from_cents(899),
            image: "img".into(),
            category: "Home".into(),
            stock: 3,
        };
        let summary = product.summary();
        assert_eq!(summary.price, product.price);
        assert_eq!(summary.id, product.id);
    }
}
