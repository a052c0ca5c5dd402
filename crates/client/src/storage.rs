//! Durable storage for the session credential pair.
//!
//! The remote API identifies a session by an opaque bearer token; alongside
//! it the client persists the identity record so a restart can restore the
//! signed-in state without a server round-trip. The pair is only meaningful
//! together, so every implementation of [`CredentialStore`] enforces
//! both-present-or-both-absent: `save` writes both, `clear` removes both,
//! and `load` treats a half-written pair as absent and heals it.
//!
//! `SessionStore` is the only writer; the transport clears through the same
//! interface on an authorization failure. Nothing else touches storage.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use maplemart_core::Identity;

/// Errors from durable storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Identity record failed to (de)serialize.
    #[error("identity serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// The durable credential pair: bearer token plus identity record.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct StoredCredentials {
    /// Opaque bearer token proving the session to the remote API.
    pub token: SecretString,
    /// Identity the token belongs to.
    pub identity: Identity,
}

impl std::fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("token", &"[REDACTED]")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Client-local persistent store for the credential pair.
pub trait CredentialStore: Send + Sync {
    /// Load the stored pair. Returns `None` when either half is missing or
    /// malformed; implementations clear the leftover half in that case.
    ///
    /// # Errors
    ///
    /// Returns an error only for underlying storage failures, never for an
    /// absent or half-written pair.
    fn load(&self) -> Result<Option<StoredCredentials>, StorageError>;

    /// Persist both halves of the pair.
    ///
    /// # Errors
    ///
    /// Returns an error if either half cannot be written; on failure the
    /// store is left without a stored pair rather than with a partial one.
    fn save(&self, credentials: &StoredCredentials) -> Result<(), StorageError>;

    /// Remove both halves of the pair. Removing an absent pair is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error for underlying storage failures.
    fn clear(&self) -> Result<(), StorageError>;
}

// =============================================================================
// File-backed store
// =============================================================================

const TOKEN_FILE: &str = "token";
const IDENTITY_FILE: &str = "identity.json";

/// Credential store backed by two files under a state directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// the first save.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn identity_path(&self) -> PathBuf {
        self.dir.join(IDENTITY_FILE)
    }
}

fn read_if_exists(path: &PathBuf) -> Result<Option<String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn remove_if_exists(path: &PathBuf) -> Result<(), StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> Result<Option<StoredCredentials>, StorageError> {
        let token = read_if_exists(&self.token_path())?;
        let identity_json = read_if_exists(&self.identity_path())?;

        match (token, identity_json) {
            (Some(token), Some(identity_json)) => {
                match serde_json::from_str::<Identity>(&identity_json) {
                    Ok(identity) => Ok(Some(StoredCredentials {
                        token: SecretString::from(token),
                        identity,
                    })),
                    Err(error) => {
                        // Malformed identity: the token alone is useless
                        tracing::warn!(%error, "stored identity is malformed, clearing session");
                        self.clear()?;
                        Ok(None)
                    }
                }
            }
            (None, None) => Ok(None),
            // Half-written pair: heal to the absent state
            _ => {
                tracing::warn!("found half-written credential pair, clearing");
                self.clear()?;
                Ok(None)
            }
        }
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let identity_json = serde_json::to_string(&credentials.identity)?;

        // Identity first: a crash between the writes leaves an identity
        // without a token, which load() heals, never a dangling token.
        fs::write(self.identity_path(), identity_json)?;
        if let Err(e) = fs::write(self.token_path(), credentials.token.expose_secret()) {
            let _ = remove_if_exists(&self.identity_path());
            return Err(e.into());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        // Token first: no window where a token exists without an identity.
        remove_if_exists(&self.token_path())?;
        remove_if_exists(&self.identity_path())?;
        Ok(())
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// In-memory credential store for tests and embedders that must not touch
/// the filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<StoredCredentials>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<Option<StoredCredentials>, StorageError> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slot.clone())
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<(), StorageError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
        Ok(())
    }
}
