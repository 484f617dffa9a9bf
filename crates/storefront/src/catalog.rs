//! In-memory product catalog.
//!
//! The catalog is a static list of products supplied at startup, either as
//! already-deserialized values or as the upstream JSON document. Lookups
//! are linear scans - the catalog holds dozens of items, not thousands.

use std::sync::Arc;

use mjengo_core::{Product, ProductId};

/// Catalog loading errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to parse catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Catalog holding the full product list in memory.
///
/// Cheaply cloneable; the product list is shared behind an `Arc` and
/// immutable for the life of the process.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Arc<Vec<Product>>,
}

impl Catalog {
    /// Create a catalog from an already-built product list.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(products),
        }
    }

    /// Load the catalog from the upstream JSON document (an array of
    /// camelCase product records).
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid catalog JSON.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_slice(bytes)?;
        tracing::info!(count = products.len(), "Catalog loaded");
        Ok(Self::new(products))
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// All products, in catalog order.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products in a category (case-insensitive), in catalog order.
    pub fn by_category(&self, category: &str) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(move |p| p.category.eq_ignore_ascii_case(category))
    }

    /// Case-insensitive substring search over product names and
    /// descriptions. A blank query matches everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.products.iter().collect();
        }
        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Purchasable products only.
    pub fn in_stock(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.in_stock)
    }

    /// All distinct categories, sorted, for navigation.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> =
            self.products.iter().map(|p| p.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }
}
