//! Rejected-credential handling: the durable pair is cleared, local state
//! is dropped, and the session-expired callback fires exactly once per
//! credential.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use maplemart_client::storage::CredentialStore;
use maplemart_core::{Price, Role};
use maplemart_integration_tests::{TestApp, test_app};

async fn expiring_app() -> (TestApp, Arc<AtomicUsize>) {
    let t = test_app().await;
    t.stub.seed_user("Ada", "ada@example.com", "hunter2", Role::User);
    t.app.initialize().await;

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    t.app.set_on_session_expired(Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    t.app.login("ada@example.com", "hunter2").await.unwrap();
    (t, fired)
}

#[tokio::test]
async fn test_rejected_credential_clears_session_and_cart() {
    let (t, fired) = expiring_app().await;
    let id = t.stub.seed_product("Mug", Price::from_cents(1000), 50);
    t.app.cart().add_item(&id, 2).await.unwrap();

    t.stub.revoke_tokens();
    let error = t.app.cart().fetch().await.unwrap_err();

    assert_eq!(error.message(), "Token is not valid");
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!t.app.session().is_authenticated());
    assert!(t.app.cart().cart().is_empty());
    assert!(t.store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_rejections_fire_callback_once() {
    let (t, fired) = expiring_app().await;
    t.stub.revoke_tokens();

    // Several requests race into the same 401
    let (a, b, c, d) = tokio::join!(
        t.app.cart().fetch(),
        t.app.api().profile(),
        t.app.api().my_orders(),
        t.app.cart().fetch(),
    );
    assert!(a.is_err());
    assert!(b.is_err());
    assert!(c.is_err());
    assert!(d.is_err());

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(t.store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_callback_rearms_after_new_login() {
    let (t, fired) = expiring_app().await;

    t.stub.revoke_tokens();
    let _ = t.app.cart().fetch().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    // Signing in again arms the notification for the new credential
    t.app.login("ada@example.com", "hunter2").await.unwrap();
    assert!(t.app.session().is_authenticated());

    t.stub.revoke_tokens();
    let _ = t.app.cart().fetch().await;
    assert_eq!(fired.load(Ordering::SeqCst), 2);
    assert!(!t.app.session().is_authenticated());
}

#[tokio::test]
async fn test_repeat_rejections_with_same_credential_stay_silent() {
    let (t, fired) = expiring_app().await;
    t.stub.revoke_tokens();

    let _ = t.app.cart().fetch().await;
    let _ = t.app.api().profile().await;
    let _ = t.app.api().my_orders().await;

    assert_eq!(fired.load(Ordering::SeqCst), 1);
}
