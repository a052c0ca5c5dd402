//! Typed wrappers for the remote API.
//!
//! One method per endpoint, grouped by area. Each wrapper builds the
//! request through [`HttpClient`] (which attaches the bearer credential and
//! owns 401 handling) and decodes the response into the core domain types.
//!
//! # Endpoint map
//!
//! - `auth` - `POST /auth/register`, `POST /auth/login`, `GET /auth/profile`
//! - `products` - `GET /products`, `GET /products/{id}`, admin CRUD
//! - `cart` - `GET /cart`, `POST /cart/add`, `PUT /cart/update`,
//!   `DELETE /cart/remove/{id}`, `DELETE /cart/clear`
//! - `orders` - `POST /orders`, `GET /orders`, `GET /orders/{id}`,
//!   `GET /orders/all`, `PUT /orders/{id}/status`

mod auth;
mod cart;
mod orders;
mod products;

pub use auth::{AuthResponse, LoginRequest, RegisterRequest};
pub use orders::OrderRequest;
pub use products::{ProductFilter, ProductInput};

use crate::http::HttpClient;

/// Typed client for every remote endpoint.
///
/// Cheaply cloneable; clones share the underlying transport.
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
}

impl ApiClient {
    /// Wrap a transport.
    #[must_use]
    pub const fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// The underlying transport.
    #[must_use]
    pub const fn http(&self) -> &HttpClient {
        &self.http
    }
}
