//! Core types for Mjengo.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod product;

pub use id::*;
pub use price::Price;
pub use product::{CartItem, Product};
