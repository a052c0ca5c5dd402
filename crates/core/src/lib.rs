//! Maplemart Core - Shared domain types.
//!
//! This crate provides common types used across all Maplemart components:
//! - `client` - Storefront state and API client library
//! - `cli` - Command-line storefront frontend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Everything
//! here is a value: newtype wrappers for IDs, emails, and prices, plus the
//! domain records the remote API exchanges (identities, products, carts,
//! orders). Derived quantities like cart totals are methods that recompute
//! from current state on every call; nothing is memoized.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, roles, and statuses
//! - [`models`] - Domain records: identity, product, cart, order

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
