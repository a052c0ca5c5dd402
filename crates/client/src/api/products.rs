//! Catalog endpoints, including the admin-only CRUD surface.
//!
//! The server enforces that only admins may create, update, or delete;
//! views gate the admin surface on `is_admin` purely for presentation.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use maplemart_core::{Price, Product, ProductId};

use crate::api::ApiClient;
use crate::error::ApiError;

/// Optional filters for the product listing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Body for product create and update.
#[derive(Debug, Clone, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image: String,
    pub category: String,
    pub stock: u32,
}

#[derive(Debug, Deserialize)]
struct ProductListResponse {
    products: Vec<Product>,
}

impl ApiClient {
    /// List products, optionally filtered. `GET /products?category?&search?`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
        let builder = self.http().request(Method::GET, "/products").query(filter);
        let response: ProductListResponse = self.http().execute(builder).await?;
        Ok(response.products)
    }

    /// Fetch a single product. `GET /products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the product does not exist.
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let builder = self.http().request(Method::GET, &format!("/products/{id}"));
        self.http().execute(builder).await
    }

    /// Create a product (admin). `POST /products`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let builder = self.http().request(Method::POST, "/products").json(input);
        self.http().execute(builder).await
    }

    /// Update a product (admin). `PUT /products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    pub async fn update_product(
        &self,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let builder = self
            .http()
            .request(Method::PUT, &format!("/products/{id}"))
            .json(input);
        self.http().execute(builder).await
    }

    /// Delete a product (admin). `DELETE /products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the caller is not an admin.
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        let builder = self
            .http()
            .request(Method::DELETE, &format!("/products/{id}"));
        self.http().execute_unit(builder).await
    }
}
