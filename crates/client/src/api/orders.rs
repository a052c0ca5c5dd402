//! Order endpoints.

use reqwest::Method;
use serde::Serialize;

use maplemart_core::{Order, OrderId, OrderStatus, PaymentInfo, ShippingAddress};

use crate::api::ApiClient;
use crate::error::ApiError;

/// Body for `POST /orders`: the server builds the order from the session's
/// cart, so only shipping and payment details travel with the request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub shipping_address: ShippingAddress,
    pub payment_info: PaymentInfo,
}

#[derive(Debug, Serialize)]
struct StatusUpdateRequest {
    status: OrderStatus,
}

impl ApiClient {
    /// Place an order from the current cart. `POST /orders`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the cart is empty.
    pub async fn place_order(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        let builder = self.http().request(Method::POST, "/orders").json(request);
        self.http().execute(builder).await
    }

    /// List the current user's orders. `GET /orders`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        let builder = self.http().request(Method::GET, "/orders");
        self.http().execute(builder).await
    }

    /// Fetch one of the current user's orders. `GET /orders/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the order does not exist
    /// or belongs to someone else.
    pub async fn order(&self, id: &OrderId) -> Result<Order, ApiError> {
        let builder = self.http().request(Method::GET, &format!("/orders/{id}"));
        self.http().execute(builder).await
    }

    /// List every order (admin). `GET /orders/all`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    pub async fn all_orders(&self) -> Result<Vec<Order>, ApiError> {
        let builder = self.http().request(Method::GET, "/orders/all");
        self.http().execute(builder).await
    }

    /// Change an order's status (admin). `PUT /orders/{id}/status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let builder = self
            .http()
            .request(Method::PUT, &format!("/orders/{id}/status"))
            .json(&StatusUpdateRequest { status });
        self.http().execute(builder).await
    }
}
