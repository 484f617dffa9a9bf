//! Cart state engine.
//!
//! A pure reducer over cart line items with a derived total. The engine has
//! no failure path: every action is a total function over the state shape,
//! and malformed actions are unrepresentable in the typed action set. The
//! [`Cart`] container is owned by the application root and passed down to
//! whatever renders it - there is no global.

use mjengo_core::{CartItem, Price, Product, ProductId};
use rust_decimal::Decimal;
use serde::Serialize;

/// Cart state: ordered line items, unique by product id, plus the derived
/// total.
///
/// `total` is recomputed from `items` after every action - never updated
/// independently. Quote-priced items stay in the list but contribute
/// nothing to the total.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub total: Decimal,
}

/// Actions the cart engine accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add a product. If the id is already in the cart, its quantity is
    /// incremented by `quantity`; otherwise a new line is appended.
    /// A zero quantity is treated as 1.
    AddItem { product: Product, quantity: u32 },
    /// Remove the matching line. A no-op if the id is absent.
    RemoveItem(ProductId),
    /// Set a line's quantity. Zero removes the line, same as `RemoveItem`.
    UpdateQuantity { id: ProductId, quantity: u32 },
    /// Empty the cart.
    Clear,
}

impl CartAction {
    /// Add a single unit of a product.
    #[must_use]
    pub const fn add(product: Product) -> Self {
        Self::AddItem {
            product,
            quantity: 1,
        }
    }
}

/// Sum of line totals, skipping quote-priced items.
fn recompute_total(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::line_total).sum()
}

/// Apply an action to a cart state, producing the next state.
///
/// Pure and synchronous: no I/O, no events, no mutation of the input.
#[must_use]
pub fn reduce(state: &CartState, action: CartAction) -> CartState {
    match action {
        CartAction::AddItem { product, quantity } => {
            let quantity = quantity.max(1);
            let mut items = state.items.clone();
            match items.iter_mut().find(|item| item.product.id == product.id) {
                Some(existing) => existing.quantity += quantity,
                None => items.push(CartItem::new(product, quantity)),
            }
            let total = recompute_total(&items);
            CartState { items, total }
        }
        CartAction::RemoveItem(id) => remove_item(state, &id),
        CartAction::UpdateQuantity { id, quantity } => {
            if quantity == 0 {
                return remove_item(state, &id);
            }
            let items: Vec<CartItem> = state
                .items
                .iter()
                .map(|item| {
                    if item.product.id == id {
                        CartItem::new(item.product.clone(), quantity)
                    } else {
                        item.clone()
                    }
                })
                .collect();
            let total = recompute_total(&items);
            CartState { items, total }
        }
        CartAction::Clear => CartState::default(),
    }
}

fn remove_item(state: &CartState, id: &ProductId) -> CartState {
    let items: Vec<CartItem> = state
        .items
        .iter()
        .filter(|item| &item.product.id != id)
        .cloned()
        .collect();
    let total = recompute_total(&items);
    CartState { items, total }
}

/// The cart container owned by the application root.
///
/// State is replaced wholesale on each dispatch (copy-on-write); the
/// previous state is discarded. Created empty at application start and
/// lost on shutdown - there is no persistence.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    state: CartState,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Apply an action, replacing the state with the reducer's output.
    pub fn dispatch(&mut self, action: CartAction) {
        self.state = reduce(&self.state, action);
    }

    /// Display data for the rendering layer.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::from(&self.state)
    }
}

// =============================================================================
// Display Data
// =============================================================================

/// Cart line display data for the rendering layer.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub id: ProductId,
    pub name: String,
    pub unit: String,
    pub quantity: u32,
    /// Formatted unit price, or "Contact for pricing".
    pub price: String,
    /// Formatted line total, or "Contact for pricing".
    pub line_total: String,
    pub image: String,
}

/// Cart display data for the rendering layer.
#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
    pub lines: Vec<CartLineView>,
    /// Formatted priced subtotal; "Contact for pricing" when the only
    /// contents are quote-priced items.
    pub subtotal: String,
    /// Sum of line quantities.
    pub item_count: u32,
    /// Whether any line is priced on request, so the UI can append
    /// "+ items priced on request" to a mixed subtotal.
    pub has_quote_items: bool,
}

impl CartSummary {
    /// Create an empty cart summary.
    #[must_use]
    pub fn empty() -> Self {
        Self::from(&CartState::default())
    }
}

impl From<&CartState> for CartSummary {
    fn from(state: &CartState) -> Self {
        let has_quote_items = state.items.iter().any(|item| item.product.price.is_quote());
        let subtotal = if state.total.is_zero() && has_quote_items {
            "Contact for pricing".to_string()
        } else {
            Price::new(state.total).format()
        };

        Self {
            lines: state.items.iter().map(CartLineView::from).collect(),
            subtotal,
            item_count: state.items.iter().map(|item| item.quantity).sum(),
            has_quote_items,
        }
    }
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        let line_total = if item.product.price.is_quote() {
            "Contact for pricing".to_string()
        } else {
            Price::new(item.line_total()).format()
        };

        Self {
            id: item.product.id.clone(),
            name: item.product.name.clone(),
            unit: item.product.unit.clone(),
            quantity: item.quantity,
            price: item.product.price.display(),
            line_total,
            image: item.product.image.clone(),
        }
    }
}
