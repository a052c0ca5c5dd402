//! Maplemart client library.
//!
//! Client-side state management and API access for the Maplemart
//! storefront. The remote API owns all business logic and authorization;
//! this crate holds the two pieces of shared client state and the transport
//! that keeps them consistent with the server:
//!
//! - [`session::SessionStore`] - the authenticated identity, mirrored into
//!   durable storage as a credential/identity pair
//! - [`cart::CartStore`] - the shopping cart, replaced wholesale with the
//!   server's response on every successful operation
//! - [`http::HttpClient`] - the single outgoing-request pipeline that
//!   attaches the bearer credential and handles authorization failures
//! - [`api::ApiClient`] - typed wrappers for every remote endpoint
//! - [`state::AppState`] - the composition root that wires the pieces
//!   together and is handed to views explicitly
//!
//! # Example
//!
//! ```rust,ignore
//! use maplemart_client::{config::ClientConfig, state::AppState};
//!
//! let config = ClientConfig::from_env()?;
//! let app = AppState::new(config);
//! app.initialize().await;
//!
//! app.login("ada@example.com", "hunter2").await?;
//! app.cart().add_item(&"p1".into(), 1).await?;
//! println!("{} items, {}", app.cart().item_count(), app.cart().subtotal());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod state;
pub mod storage;

pub use api::ApiClient;
pub use cart::CartStore;
pub use config::ClientConfig;
pub use error::{ActionError, ActionResult, ApiError};
pub use session::SessionStore;
pub use state::AppState;
