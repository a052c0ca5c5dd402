//! Domain records exchanged with the remote API.

pub mod cart;
pub mod identity;
pub mod order;
pub mod product;

pub use cart::{Cart, LineItem};
pub use identity::Identity;
pub use order::{Order, OrderUser, PaymentInfo, ShippingAddress};
pub use product::{Product, ProductSummary};
