//! Error types for the client library.
//!
//! Two layers: [`ApiError`] is what the transport and typed API surface to
//! the stores; [`ActionError`] is the display-message result store
//! operations hand to views. Transport and decode details never cross the
//! store boundary.

use thiserror::Error;

/// Errors from the HTTP transport and the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or protocol failure before a usable response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the session credential (HTTP 401). By the time
    /// callers see this, the durable credential pair has been cleared and
    /// the unauthorized callback has fired.
    #[error("unauthorized: {}", .message.as_deref().unwrap_or("session rejected"))]
    Unauthorized {
        /// Message from the error payload, if the server sent one.
        message: Option<String>,
    },

    /// Any other non-success status.
    #[error("api error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        /// HTTP status code.
        status: reqwest::StatusCode,
        /// Message from the conventional `{ message }` error payload.
        message: Option<String>,
    },

    /// Response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Human-readable message from the server's error payload, if any.
    #[must_use]
    pub fn payload_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message } | Self::Status { message, .. } => message.as_deref(),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Display message for views: the payload message when present,
    /// otherwise the caller's generic fallback.
    #[must_use]
    pub fn display_message(&self, fallback: &str) -> String {
        self.payload_message().unwrap_or(fallback).to_owned()
    }
}

/// Failure result of a store operation, carrying only a display message.
///
/// Store operations return `Result<(), ActionError>`; callers branch on the
/// result and show the message, they never need to match on transport
/// details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ActionError(String);

impl ActionError {
    /// Create an action error from a display message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Build from an API error with a per-operation fallback message.
    #[must_use]
    pub fn from_api(error: &ApiError, fallback: &str) -> Self {
        Self(error.display_message(fallback))
    }

    /// The display message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Result type for store operations.
pub type ActionResult = Result<(), ActionError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_message_prefers_payload() {
        let err = ApiError::Status {
            status: reqwest::StatusCode::BAD_REQUEST,
            message: Some("Product out of stock".to_owned()),
        };
        assert_eq!(
            err.display_message("Failed to add to cart"),
            "Product out of stock"
        );
    }

    #[test]
    fn test_display_message_fallback_without_payload() {
        let err = ApiError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(
            err.display_message("Failed to add to cart"),
            "Failed to add to cart"
        );
    }

    #[test]
    fn test_unauthorized_display() {
        let err = ApiError::Unauthorized { message: None };
        assert_eq!(err.to_string(), "unauthorized: session rejected");
    }

    #[test]
    fn test_action_error_from_api() {
        let err = ApiError::Unauthorized {
            message: Some("Token expired".to_owned()),
        };
        let action = ActionError::from_api(&err, "Login failed");
        assert_eq!(action.message(), "Token expired");
    }
}
