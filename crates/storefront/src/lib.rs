//! Mjengo Storefront - catalog, cart engine, and image pipeline.
//!
//! The in-memory core of the Mjengo storefront. The rendering layer (out
//! of scope here) consumes this crate through [`state::AppState`] and a
//! root-owned [`cart::Cart`].
//!
//! # Architecture
//!
//! - A static product [`catalog`](catalog::Catalog) supplied at startup -
//!   no database, no backend
//! - A pure cart [reducer](cart::reduce) with a root-owned state container
//! - Pure CDN URL [optimization](images::ImageOptimizer) for responsive,
//!   format-negotiated image delivery
//! - A bounded-concurrency, fire-and-forget image
//!   [preloader](images::Preloader)
//!
//! There is no persistence and no checkout: the cart lives in memory for
//! the life of the process, and a broken image load never becomes anyone
//! else's error.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod images;
pub mod state;
