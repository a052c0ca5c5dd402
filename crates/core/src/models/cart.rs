//! Shopping cart contents.

use serde::{Deserialize, Serialize};

use crate::models::product::ProductSummary;
use crate::types::Price;

/// One product-quantity pair within a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Server-supplied product snapshot.
    pub product: ProductSummary,
    /// Units of the product in the cart. The server keeps this >= 1; a
    /// quantity dropping to zero removes the line instead.
    pub quantity: u32,
}

impl LineItem {
    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Ordered collection of line items belonging to the current session.
///
/// The server is the sole source of truth: every successful fetch or
/// mutation replaces the whole value, never patches it in place. Derived
/// quantities are recomputed on each call and never memoized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Cart {
    /// Line items, at most one per distinct product ID (server-enforced).
    pub items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines. Zero for an empty cart.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of all line totals. Zero for an empty cart.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    fn line(id: &str, cents: i64, quantity: u32) -> LineItem {
        LineItem {
            product: ProductSummary {
                id: ProductId::new(id),
                name: id.to_owned(),
                price: Price::from_cents(cents),
                image: String::new(),
            },
            quantity,
        }
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = Cart::empty();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.subtotal(), Price::ZERO);
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let cart = Cart {
            items: vec![line("p1", 100, 2), line("p2", 100, 3)],
        };
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_subtotal_sums_line_totals() {
        // 10.00 * 2 + 5.00 * 1 = 25.00
        let cart = Cart {
            items: vec![line("p1", 1000, 2), line("p2", 500, 1)],
        };
        assert_eq!(cart.subtotal(), Price::from_cents(2500));
    }

    #[test]
    fn test_subtotal_decimal_precision() {
        let cart = Cart {
            items: vec![line("p1", 999, 1)],
        };
        assert_eq!(cart.subtotal(), Price::from_cents(999));
        assert_eq!(cart.subtotal().display(), "$9.99");
    }

    #[test]
    fn test_deserialize_from_api_shape() {
        let cart: Cart = serde_json::from_str(
            r#"{"items":[{"product":{"id":"p1","name":"Mug","price":9.99,"image":""},"quantity":1}]}"#,
        )
        .unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.subtotal(), Price::from_cents(999));
    }
}
