//! Mjengo Core - Shared types library.
//!
//! This crate provides common types used across all Mjengo components:
//! - `storefront` - Catalog, cart engine, and image pipeline
//! - `integration-tests` - Cross-crate scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Slug IDs, prices, and the product/cart-item data model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
