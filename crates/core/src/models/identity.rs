//! Authenticated identity.

use serde::{Deserialize, Serialize};

use crate::types::{Email, Role, UserId};

/// The authenticated user's profile and role.
///
/// Created from a successful login or registration response and destroyed on
/// logout or when the remote API rejects the session's credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Server-assigned account ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Account email address.
    pub email: Email,
    /// Account role.
    pub role: Role,
}

impl Identity {
    /// Whether this identity grants admin capability.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
