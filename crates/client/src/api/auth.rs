//! Authentication endpoints.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use maplemart_core::Identity;

use crate::api::ApiClient;
use crate::error::ApiError;

/// Body for `POST /auth/register`.
///
/// Implements `Debug` manually to redact the password.
#[derive(Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body for `POST /auth/login`.
///
/// Implements `Debug` manually to redact the password.
#[derive(Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Response of the login and register endpoints: a bearer token plus the
/// identity fields at the top level.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    /// Opaque bearer token for subsequent requests.
    pub token: String,
    /// The authenticated identity.
    #[serde(flatten)]
    pub identity: Identity,
}

impl ApiClient {
    /// Create an account. `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the email is already taken.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let builder = self
            .http()
            .request(Method::POST, "/auth/register")
            .json(request);
        self.http().execute(builder).await
    }

    /// Authenticate with email and password. `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are invalid.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let builder = self
            .http()
            .request(Method::POST, "/auth/login")
            .json(request);
        self.http().execute(builder).await
    }

    /// Fetch the current identity. `GET /auth/profile`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    pub async fn profile(&self) -> Result<Identity, ApiError> {
        let builder = self.http().request(Method::GET, "/auth/profile");
        self.http().execute(builder).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_flattens_identity() {
        let response: AuthResponse = serde_json::from_str(
            r#"{"token":"tok","id":"u1","name":"Ada","email":"ada@example.com","role":"user"}"#,
        )
        .unwrap();
        assert_eq!(response.token, "tok");
        assert_eq!(response.identity.name, "Ada");
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let login = LoginRequest {
            email: "ada@example.com".to_owned(),
            password: "hunter2".to_owned(),
        };
        let debug = format!("{login:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }
}
