//! Catalog browsing and the admin product CRUD surface.

#![allow(clippy::unwrap_used)]

use maplemart_client::api::{ProductFilter, ProductInput};
use maplemart_core::{Price, ProductId, Role};
use maplemart_integration_tests::{TestApp, test_app};

async fn stocked_app() -> TestApp {
    let t = test_app().await;
    t.stub.seed_user("Root", "root@example.com", "s3cret", Role::Admin);
    t.stub.seed_user("Ada", "ada@example.com", "hunter2", Role::User);
    t.stub.seed_product("Blue Mug", Price::from_cents(1000), 50);
    t.stub.seed_product("Red Mug", Price::from_cents(1200), 20);
    t.app.initialize().await;
    t
}

fn input(name: &str) -> ProductInput {
    ProductInput {
        name: name.to_owned(),
        description: format!("{name} description"),
        price: Price::from_cents(2500),
        image: "img.png".to_owned(),
        category: "General".to_owned(),
        stock: 5,
    }
}

#[tokio::test]
async fn test_list_is_public_and_searchable() {
    let t = stocked_app().await;

    // Browsing requires no session
    let all = t.app.api().products(&ProductFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let filter = ProductFilter {
        category: None,
        search: Some("blue".to_owned()),
    };
    let found = t.app.api().products(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found.first().unwrap().name, "Blue Mug");
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let t = stocked_app().await;

    let error = t
        .app
        .api()
        .product(&ProductId::new("missing"))
        .await
        .unwrap_err();
    assert_eq!(error.payload_message(), Some("Product not found"));
}

#[tokio::test]
async fn test_admin_crud_roundtrip() {
    let t = stocked_app().await;
    t.app.login("root@example.com", "s3cret").await.unwrap();

    let created = t.app.api().create_product(&input("Teapot")).await.unwrap();
    assert_eq!(created.name, "Teapot");

    let mut update = input("Teapot XL");
    update.stock = 9;
    let updated = t
        .app
        .api()
        .update_product(&created.id, &update)
        .await
        .unwrap();
    assert_eq!(updated.name, "Teapot XL");
    assert_eq!(updated.stock, 9);

    t.app.api().delete_product(&created.id).await.unwrap();
    let error = t.app.api().product(&created.id).await.unwrap_err();
    assert_eq!(error.payload_message(), Some("Product not found"));
}

#[tokio::test]
async fn test_non_admin_cannot_manage_catalog() {
    let t = stocked_app().await;
    t.app.login("ada@example.com", "hunter2").await.unwrap();

    let error = t.app.api().create_product(&input("Teapot")).await.unwrap_err();
    assert_eq!(error.payload_message(), Some("Admin access required"));
}
