//! Session lifecycle against the stub API: register, login, logout,
//! restore, and the durable credential pair.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use maplemart_client::storage::CredentialStore;
use maplemart_client::{AppState, ClientConfig};
use maplemart_core::Role;
use maplemart_integration_tests::test_app;
use secrecy::ExposeSecret;

// =============================================================================
// Register / login
// =============================================================================

#[tokio::test]
async fn test_register_signs_in_as_user() {
    let t = test_app().await;
    t.app.initialize().await;

    t.app
        .register("Ada", "ada@example.com", "hunter2")
        .await
        .unwrap();

    assert!(t.app.session().is_authenticated());
    assert!(!t.app.session().is_admin());
    let identity = t.app.session().identity().unwrap();
    assert_eq!(identity.name, "Ada");
    assert_eq!(identity.role, Role::User);
}

#[tokio::test]
async fn test_login_as_seeded_admin() {
    let t = test_app().await;
    t.stub.seed_user("Root", "root@example.com", "s3cret", Role::Admin);
    t.app.initialize().await;

    t.app.login("root@example.com", "s3cret").await.unwrap();

    assert!(t.app.session().is_authenticated());
    assert!(t.app.session().is_admin());
}

#[tokio::test]
async fn test_login_failure_surfaces_server_message() {
    let t = test_app().await;
    t.stub.seed_user("Ada", "ada@example.com", "hunter2", Role::User);
    t.app.initialize().await;

    let error = t.app.login("ada@example.com", "wrong").await.unwrap_err();

    assert_eq!(error.message(), "Invalid credentials");
    assert!(!t.app.session().is_authenticated());
    assert!(t.store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_fails() {
    let t = test_app().await;
    t.stub.seed_user("Ada", "ada@example.com", "hunter2", Role::User);
    t.app.initialize().await;

    let error = t
        .app
        .register("Ada Again", "ada@example.com", "other")
        .await
        .unwrap_err();

    assert_eq!(error.message(), "User already exists");
    assert!(!t.app.session().is_authenticated());
}

// =============================================================================
// Durable pair and restore
// =============================================================================

#[tokio::test]
async fn test_login_persists_credential_pair() {
    let t = test_app().await;
    t.stub.seed_user("Ada", "ada@example.com", "hunter2", Role::User);
    t.app.initialize().await;

    t.app.login("ada@example.com", "hunter2").await.unwrap();

    let stored = t.store.load().unwrap().unwrap();
    assert!(!stored.token.expose_secret().is_empty());
    assert_eq!(stored.identity.name, "Ada");
}

#[tokio::test]
async fn test_restore_reuses_stored_session() {
    let t = test_app().await;
    t.stub.seed_user("Ada", "ada@example.com", "hunter2", Role::User);
    t.app.initialize().await;
    t.app.login("ada@example.com", "hunter2").await.unwrap();

    // A second app instance sharing the storage picks the session up
    // without a new login.
    let config = ClientConfig::new(
        t.stub.api_url().parse().unwrap(),
        std::env::temp_dir(),
    );
    let storage: Arc<dyn CredentialStore> = t.store.clone();
    let second = AppState::with_store(config, storage);
    assert!(second.session().is_initializing());

    second.initialize().await;

    assert!(!second.session().is_initializing());
    assert!(second.session().is_authenticated());
    assert_eq!(second.session().identity().unwrap().name, "Ada");

    // The restored credential works against the server
    let profile = second.api().profile().await.unwrap();
    assert_eq!(profile.name, "Ada");
}

#[tokio::test]
async fn test_logout_clears_everything() {
    let t = test_app().await;
    t.stub.seed_user("Ada", "ada@example.com", "hunter2", Role::User);
    t.app.initialize().await;
    t.app.login("ada@example.com", "hunter2").await.unwrap();

    t.app.logout();

    assert!(!t.app.session().is_authenticated());
    assert!(t.store.load().unwrap().is_none());
    assert!(t.app.cart().cart().is_empty());
}
