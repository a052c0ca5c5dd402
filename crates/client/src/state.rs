//! Application state: one object wiring the transport, the typed API
//! client, and the two stores together.
//!
//! `AppState` is the composition root. It installs the unauthorized hook
//! on the transport so a rejected credential signs the user out, resets
//! the cart, and (at most once per credential) notifies the embedder.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::instrument;

use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::config::ClientConfig;
use crate::error::ActionResult;
use crate::http::HttpClient;
use crate::session::SessionStore;
use crate::storage::{CredentialStore, FileStore};

/// Callback invoked when the server rejects the session's credential.
pub type SessionExpiredHook = Box<dyn Fn() + Send + Sync>;

/// Shared application state.
///
/// Cheaply cloneable; clones share state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ClientConfig,
    api: ApiClient,
    session: SessionStore,
    cart: CartStore,
    on_session_expired: RwLock<Option<SessionExpiredHook>>,
}

impl AppState {
    /// Build the state with file-backed credential storage under the
    /// configured state directory.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let store = Arc::new(FileStore::new(config.state_dir.clone()));
        Self::with_store(config, store)
    }

    /// Build the state with the given credential storage. Tests use this
    /// with in-memory storage.
    #[must_use]
    pub fn with_store(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Self {
        let http = HttpClient::new(&config, Arc::clone(&store));
        let api = ApiClient::new(http);
        let session = SessionStore::new(api.clone(), store);
        let cart = CartStore::new(api.clone());

        let state = Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                session,
                cart,
                on_session_expired: RwLock::new(None),
            }),
        };

        // Weak handles so the hook does not keep the stores alive past
        // the last AppState clone
        let weak_session = state.inner.session.downgrade();
        let weak_cart = state.inner.cart.downgrade();
        let weak_state = Arc::downgrade(&state.inner);
        state
            .inner
            .api
            .http()
            .set_on_unauthorized(move || {
                if let Some(session) = weak_session.upgrade() {
                    session.clear_in_memory();
                }
                if let Some(cart) = weak_cart.upgrade() {
                    cart.reset();
                }
                if let Some(inner) = weak_state.upgrade() {
                    let guard = inner
                        .on_session_expired
                        .read()
                        .unwrap_or_else(PoisonError::into_inner);
                    if let Some(hook) = guard.as_ref() {
                        hook();
                    }
                }
            });

        state
    }

    /// Register the embedder's session-expired callback, replacing any
    /// previous one. Fired at most once per credential.
    pub fn set_on_session_expired(&self, hook: SessionExpiredHook) {
        let mut guard = self
            .inner
            .on_session_expired
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(hook);
    }

    /// Restore the session from storage and, if signed in, load the cart.
    /// Cart load failures are non-fatal at startup.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        self.inner.session.restore();
        if self.inner.session.is_authenticated() {
            if let Err(error) = self.inner.cart.fetch().await {
                tracing::warn!(message = error.message(), "could not load cart at startup");
            }
        }
    }

    /// Sign in, then load the new session's cart.
    ///
    /// # Errors
    ///
    /// Returns the login error; the cart is only fetched after a
    /// successful login, and its failure is non-fatal.
    pub async fn login(&self, email: &str, password: &str) -> ActionResult {
        self.inner.session.login(email, password).await?;
        if let Err(error) = self.inner.cart.fetch().await {
            tracing::warn!(message = error.message(), "could not load cart after login");
        }
        Ok(())
    }

    /// Create an account, sign in, then load the session's cart.
    ///
    /// # Errors
    ///
    /// Returns the registration error; the cart fetch failure is
    /// non-fatal.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ActionResult {
        self.inner.session.register(name, email, password).await?;
        if let Err(error) = self.inner.cart.fetch().await {
            tracing::warn!(
                message = error.message(),
                "could not load cart after registration"
            );
        }
        Ok(())
    }

    /// Sign out and drop the local cart. Synchronous and always succeeds.
    pub fn logout(&self) {
        self.inner.session.logout();
        self.inner.cart.reset();
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}
