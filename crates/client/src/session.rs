//! Session state: the authenticated identity.
//!
//! `SessionStore` owns the identity and is the only writer of durable
//! credential storage. Login and register persist the token/identity pair
//! and update memory together; from the caller's perspective the pair
//! either fully changes or not at all. Logout is synchronous and always
//! succeeds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use secrecy::SecretString;
use tracing::{instrument, warn};

use maplemart_core::Identity;

use crate::api::{ApiClient, AuthResponse, LoginRequest, RegisterRequest};
use crate::error::{ActionError, ActionResult};
use crate::storage::{CredentialStore, StoredCredentials};

/// Store for the authenticated identity.
///
/// Cheaply cloneable; clones share state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    api: ApiClient,
    store: Arc<dyn CredentialStore>,
    identity: RwLock<Option<Identity>>,
    /// True until `restore()` has resolved. Views must not make
    /// authorization decisions while this is set.
    initializing: AtomicBool,
}

impl SessionStore {
    /// Create a store. The session is considered initializing until
    /// [`Self::restore`] runs.
    #[must_use]
    pub(crate) fn new(api: ApiClient, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                api,
                store,
                identity: RwLock::new(None),
                initializing: AtomicBool::new(true),
            }),
        }
    }

    /// Restore the session from durable storage, without re-validating
    /// against the server. A missing or malformed pair leaves the session
    /// signed out. Always clears the initializing flag.
    pub fn restore(&self) {
        match self.inner.store.load() {
            Ok(Some(credentials)) => {
                self.set_identity(Some(credentials.identity));
            }
            Ok(None) => {}
            Err(error) => {
                warn!(%error, "could not restore session from storage");
            }
        }
        self.inner.initializing.store(false, Ordering::SeqCst);
    }

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns a display-message error; the session is unchanged on
    /// failure.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> ActionResult {
        let request = LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        let response = self
            .inner
            .api
            .login(&request)
            .await
            .map_err(|e| ActionError::from_api(&e, "Login failed"))?;

        self.install(response)
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns a display-message error; the session is unchanged on
    /// failure.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ActionResult {
        let request = RegisterRequest {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        };
        let response = self
            .inner
            .api
            .register(&request)
            .await
            .map_err(|e| ActionError::from_api(&e, "Registration failed"))?;

        self.install(response)
    }

    /// Sign out: clear the durable pair and the in-memory identity.
    /// Synchronous and always succeeds.
    pub fn logout(&self) {
        if let Err(error) = self.inner.store.clear() {
            // Memory is still cleared; a stale pair on disk is healed by
            // the next restore()
            warn!(%error, "could not clear durable session state");
        }
        self.set_identity(None);
    }

    /// The current identity, if signed in.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.inner
            .identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether an identity is set.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Whether the identity is set and carries the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.inner
            .identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(Identity::is_admin)
    }

    /// True until [`Self::restore`] has resolved.
    #[must_use]
    pub fn is_initializing(&self) -> bool {
        self.inner.initializing.load(Ordering::SeqCst)
    }

    /// Drop the in-memory identity without touching durable storage.
    /// Used by the unauthorized path, where the transport has already
    /// cleared the durable pair.
    pub(crate) fn clear_in_memory(&self) {
        self.set_identity(None);
    }

    /// Weak handle for wiring callbacks without keeping the store alive.
    pub(crate) fn downgrade(&self) -> WeakSessionStore {
        WeakSessionStore(Arc::downgrade(&self.inner))
    }

    /// Persist and adopt a successful auth response.
    fn install(&self, response: AuthResponse) -> ActionResult {
        let credentials = StoredCredentials {
            token: SecretString::from(response.token),
            identity: response.identity.clone(),
        };

        if let Err(error) = self.inner.store.save(&credentials) {
            warn!(%error, "could not persist session");
            return Err(ActionError::new("Could not save your session"));
        }

        self.set_identity(Some(response.identity));
        // A fresh credential means a later rejection is news again
        self.inner.api.http().rearm_unauthorized();
        Ok(())
    }

    fn set_identity(&self, identity: Option<Identity>) {
        let mut guard = self
            .inner
            .identity
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = identity;
    }
}

/// Weak handle to a [`SessionStore`].
pub(crate) struct WeakSessionStore(Weak<SessionStoreInner>);

impl WeakSessionStore {
    pub(crate) fn upgrade(&self) -> Option<SessionStore> {
        self.0.upgrade().map(|inner| SessionStore { inner })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::http::HttpClient;
    use crate::storage::MemoryStore;
    use maplemart_core::{Email, Role, UserId};
    use secrecy::ExposeSecret;

    fn store_with_memory() -> (SessionStore, Arc<MemoryStore>) {
        let memory = Arc::new(MemoryStore::new());
        let storage: Arc<dyn CredentialStore> = memory.clone();
        let config = ClientConfig::new(
            "http://127.0.0.1:9".parse().unwrap(),
            std::env::temp_dir(),
        );
        let http = HttpClient::new(&config, Arc::clone(&storage));
        let session = SessionStore::new(ApiClient::new(http), storage);
        (session, memory)
    }

    fn identity(role: Role) -> Identity {
        Identity {
            id: UserId::new("u1"),
            name: "Ada".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            role,
        }
    }

    #[test]
    fn test_starts_initializing_and_signed_out() {
        let (session, _) = store_with_memory();
        assert!(session.is_initializing());
        assert!(!session.is_authenticated());
        assert!(!session.is_admin());
    }

    #[test]
    fn test_restore_with_empty_storage() {
        let (session, _) = store_with_memory();
        session.restore();
        assert!(!session.is_initializing());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_restore_adopts_stored_pair() {
        let (session, memory) = store_with_memory();
        memory
            .save(&StoredCredentials {
                token: SecretString::from("tok"),
                identity: identity(Role::Admin),
            })
            .unwrap();

        session.restore();
        assert!(session.is_authenticated());
        assert!(session.is_admin());
        assert_eq!(session.identity().unwrap().name, "Ada");
    }

    #[test]
    fn test_logout_clears_memory_and_storage() {
        let (session, memory) = store_with_memory();
        memory
            .save(&StoredCredentials {
                token: SecretString::from("tok"),
                identity: identity(Role::User),
            })
            .unwrap();
        session.restore();
        assert!(session.is_authenticated());

        session.logout();
        assert!(!session.is_authenticated());
        assert!(memory.load().unwrap().is_none());
    }

    #[test]
    fn test_install_persists_both_halves() {
        let (session, memory) = store_with_memory();
        session
            .install(AuthResponse {
                token: "tok-9".to_owned(),
                identity: identity(Role::User),
            })
            .unwrap();

        let stored = memory.load().unwrap().unwrap();
        assert_eq!(stored.token.expose_secret(), "tok-9");
        assert_eq!(stored.identity, identity(Role::User));
        assert!(session.is_authenticated());
        assert!(!session.is_admin());
    }
}
