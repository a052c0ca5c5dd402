//! Cart endpoints.
//!
//! Every mutation returns the full new cart; callers replace their local
//! copy wholesale rather than patching it.

use reqwest::Method;
use serde::Serialize;

use maplemart_core::{Cart, ProductId};

use crate::api::ApiClient;
use crate::error::ApiError;

/// Body for cart add and update.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartItemRequest<'a> {
    product_id: &'a ProductId,
    quantity: u32,
}

impl ApiClient {
    /// Fetch the current cart. `GET /cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    pub async fn cart(&self) -> Result<Cart, ApiError> {
        let builder = self.http().request(Method::GET, "/cart");
        self.http().execute(builder).await
    }

    /// Add units of a product. `POST /cart/add`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the server's cart is
    /// unchanged in that case.
    pub async fn add_to_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        let builder = self
            .http()
            .request(Method::POST, "/cart/add")
            .json(&CartItemRequest {
                product_id,
                quantity,
            });
        self.http().execute(builder).await
    }

    /// Set the absolute quantity of a product. `PUT /cart/update`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_cart_item(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        let builder = self
            .http()
            .request(Method::PUT, "/cart/update")
            .json(&CartItemRequest {
                product_id,
                quantity,
            });
        self.http().execute(builder).await
    }

    /// Remove a product's line entirely. `DELETE /cart/remove/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Result<Cart, ApiError> {
        let builder = self
            .http()
            .request(Method::DELETE, &format!("/cart/remove/{product_id}"));
        self.http().execute(builder).await
    }

    /// Empty the cart. `DELETE /cart/clear`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn clear_cart(&self) -> Result<Cart, ApiError> {
        let builder = self.http().request(Method::DELETE, "/cart/clear");
        self.http().execute(builder).await
    }
}
