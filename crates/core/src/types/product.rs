//! The product and cart-item data model.
//!
//! Products are static, externally supplied, and immutable at runtime. The
//! serde shape uses camelCase field names to match the upstream catalog
//! data (`inStock`, `image2`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A catalog product.
///
/// `price` is non-negative; the zero sentinel means "contact for pricing"
/// and is excluded from monetary totals (see [`Price::is_quote`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique catalog key, e.g. `culvert-900mm`.
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Display category, e.g. `drainage`.
    pub category: String,
    /// Sales unit, e.g. `per piece`.
    pub unit: String,
    pub price: Price,
    /// Primary product photo (CDN delivery URL).
    pub image: String,
    /// Optional second photo for the product detail view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image2: Option<String>,
    /// Purchasability gate.
    pub in_stock: bool,
}

/// One cart line: a product plus a positive quantity.
///
/// An item with quantity zero never persists in a cart - the engine removes
/// it instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Create a new line item.
    #[must_use]
    pub const fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Monetary contribution of this line to the cart total.
    ///
    /// Quote-sentinel items contribute zero while remaining in the list.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        if self.product.price.is_quote() {
            Decimal::ZERO
        } else {
            self.product.price.amount() * Decimal::from(self.quantity)
        }
    }
}
