//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `MAPLEMART_API_URL` - Base URL of the remote API (default: `http://localhost:5000/api`)
//! - `MAPLEMART_STATE_DIR` - Directory for durable session state (default: `$HOME/.maplemart`)
//! - `MAPLEMART_TIMEOUT_SECS` - Per-request timeout in seconds (default: transport default)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default API base URL when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the remote API, without a trailing slash.
    pub api_url: Url,
    /// Directory holding the durable credential/identity pair.
    pub state_dir: PathBuf,
    /// Per-request timeout. `None` leaves the transport default.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a set variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("MAPLEMART_API_URL", DEFAULT_API_URL))?;
        let state_dir = get_optional_env("MAPLEMART_STATE_DIR")
            .map_or_else(default_state_dir, PathBuf::from);
        let request_timeout = get_optional_env("MAPLEMART_TIMEOUT_SECS")
            .map(|raw| parse_timeout(&raw))
            .transpose()?;

        Ok(Self {
            api_url,
            state_dir,
            request_timeout,
        })
    }

    /// A configuration for talking to a given base URL, with state kept in
    /// the given directory. Used by tests and embedders.
    #[must_use]
    pub const fn new(api_url: Url, state_dir: PathBuf) -> Self {
        Self {
            api_url,
            state_dir,
            request_timeout: None,
        }
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("MAPLEMART_API_URL".to_owned(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "MAPLEMART_API_URL".to_owned(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw.parse::<u64>().map_err(|e| {
        ConfigError::InvalidEnvVar("MAPLEMART_TIMEOUT_SECS".to_owned(), e.to_string())
    })?;
    Ok(Duration::from_secs(secs))
}

fn default_state_dir() -> PathBuf {
    std::env::var_os("HOME").map_or_else(|| PathBuf::from(".maplemart"), |home| {
        PathBuf::from(home).join(".maplemart")
    })
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
