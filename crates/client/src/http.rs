//! The single outgoing-request pipeline.
//!
//! Every request the client makes goes through [`HttpClient`]: it attaches
//! the durably stored bearer credential, and on an authorization failure it
//! clears the credential pair and fires an application-wired callback
//! exactly once. It deliberately does nothing else: no retry, no backoff,
//! no timeout policy beyond the configured per-request timeout. Resilience
//! belongs to the server and the views, not this layer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::storage::CredentialStore;

/// Callback fired once when the remote API rejects the session credential.
///
/// The transport knows nothing about navigation; the application wires this
/// to whatever "go to the login surface" means for it.
pub type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

/// Conventional error payload shape: `{ "message": "..." }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for the remote API.
///
/// Cheaply cloneable; all clones share the credential store and the
/// one-shot unauthorized gate.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

struct HttpClientInner {
    client: reqwest::Client,
    /// Base URL without a trailing slash; paths are appended verbatim.
    base_url: String,
    store: Arc<dyn CredentialStore>,
    request_timeout: Option<Duration>,
    on_unauthorized: RwLock<Option<UnauthorizedHook>>,
    /// One-shot gate so concurrent 401s notify the application once.
    unauthorized_notified: AtomicBool,
}

impl HttpClient {
    /// Create a new client for the configured API, reading the bearer
    /// credential from `store` on every request.
    #[must_use]
    pub fn new(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> Self {
        let base_url = config.api_url.as_str().trim_end_matches('/').to_owned();

        Self {
            inner: Arc::new(HttpClientInner {
                client: reqwest::Client::new(),
                base_url,
                store,
                request_timeout: config.request_timeout,
                on_unauthorized: RwLock::new(None),
                unauthorized_notified: AtomicBool::new(false),
            }),
        }
    }

    /// Install the unauthorized callback. Replaces any previous hook.
    pub fn set_on_unauthorized(&self, hook: impl Fn() + Send + Sync + 'static) {
        let mut guard = self
            .inner
            .on_unauthorized
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(Box::new(hook));
    }

    /// Re-arm the one-shot unauthorized gate. Called after a successful
    /// login or registration so a later expired session notifies again.
    pub(crate) fn rearm_unauthorized(&self) {
        self.inner.unauthorized_notified.store(false, Ordering::SeqCst);
    }

    /// Build a request for `path` (e.g., `/cart/add`) with the bearer
    /// credential attached when one is stored.
    pub(crate) fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.inner.base_url);
        let mut builder = self.inner.client.request(method, url);

        if let Some(timeout) = self.inner.request_timeout {
            builder = builder.timeout(timeout);
        }

        match self.inner.store.load() {
            Ok(Some(credentials)) => {
                builder = builder.bearer_auth(credentials.token.expose_secret());
            }
            Ok(None) => {}
            Err(error) => {
                // An unreadable store means we proceed anonymously; the
                // server will reject anything that needed the credential.
                warn!(%error, "could not read stored credential");
            }
        }

        builder
    }

    /// Send a request and decode a JSON response body.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthorized`] on 401, after clearing the credential
    ///   pair and firing the unauthorized callback
    /// - [`ApiError::Status`] on any other non-success status, with the
    ///   payload's `message` extracted when present
    /// - [`ApiError::Transport`] / [`ApiError::Decode`] for network and
    ///   body-shape failures
    #[instrument(skip(self, builder))]
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        self.check_status(status, &text)?;

        serde_json::from_str(&text).map_err(|error| {
            warn!(
                %error,
                body = %text.chars().take(200).collect::<String>(),
                "failed to decode response body"
            );
            ApiError::Decode(error)
        })
    }

    /// Send a request where the response body is irrelevant (deletes).
    pub(crate) async fn execute_unit(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<(), ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        self.check_status(status, &text)
    }

    fn check_status(&self, status: StatusCode, body: &str) -> Result<(), ApiError> {
        if status == StatusCode::UNAUTHORIZED {
            let message = payload_message(body);
            self.handle_unauthorized();
            return Err(ApiError::Unauthorized { message });
        }

        if !status.is_success() {
            let message = payload_message(body);
            debug!(status = %status, "request rejected");
            return Err(ApiError::Status { status, message });
        }

        Ok(())
    }

    /// 401 handling: clear the durable pair synchronously, then notify the
    /// application once. Callers still see the rejected operation.
    fn handle_unauthorized(&self) {
        if let Err(error) = self.inner.store.clear() {
            warn!(%error, "failed to clear credentials after 401");
        }

        if !self.inner.unauthorized_notified.swap(true, Ordering::SeqCst) {
            let guard = self
                .inner
                .on_unauthorized
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(hook) = guard.as_ref() {
                hook();
            }
        }
    }
}

fn payload_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_message_extraction() {
        assert_eq!(
            payload_message(r#"{"message":"Invalid credentials"}"#),
            Some("Invalid credentials".to_owned())
        );
        assert_eq!(payload_message(r#"{"message":null}"#), None);
        assert_eq!(payload_message("{}"), None);
        assert_eq!(payload_message("<html>502</html>"), None);
    }
}
