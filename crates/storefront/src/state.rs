//! Application state shared across the rendering layer.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::images::{HttpFetcher, ImageFetcher, ImageOptimizer, Preloader};

/// Application state shared with everything that renders the storefront.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the catalog, and the image pipeline.
///
/// The cart is deliberately NOT here: it is a [`crate::cart::Cart`] value
/// the application root owns and passes down, so cart state has exactly
/// one owner and the engine stays unit-testable in isolation.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    optimizer: ImageOptimizer,
    preloader: Preloader,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `catalog` - The loaded product catalog
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Self {
        Self::with_fetcher(config, catalog, Arc::new(HttpFetcher::new()))
    }

    /// Create a new application state with a custom image fetcher.
    #[must_use]
    pub fn with_fetcher(
        config: StorefrontConfig,
        catalog: Catalog,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        let optimizer = ImageOptimizer::new(config.cdn.clone());
        let preloader = Preloader::with_fetcher(&config.preload, fetcher);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                optimizer,
                preloader,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the image URL optimizer.
    #[must_use]
    pub fn optimizer(&self) -> &ImageOptimizer {
        &self.inner.optimizer
    }

    /// Get a reference to the image preloader.
    #[must_use]
    pub fn preloader(&self) -> &Preloader {
        &self.inner.preloader
    }

    /// Queue every catalog product image for background preloading, the
    /// primary photos ahead of the secondary ones.
    pub async fn warm_product_images(&self) {
        let primary: Vec<String> = self
            .inner
            .catalog
            .all()
            .iter()
            .map(|p| p.image.clone())
            .collect();
        let secondary: Vec<String> = self
            .inner
            .catalog
            .all()
            .iter()
            .filter_map(|p| p.image2.clone())
            .collect();

        self.inner
            .preloader
            .enqueue(primary, crate::images::Priority::High)
            .await;
        self.inner
            .preloader
            .enqueue(secondary, crate::images::Priority::Low)
            .await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_cheaply_cloneable() {
        let state = AppState::new(StorefrontConfig::default(), Catalog::new(Vec::new()));
        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.inner, &clone.inner));
        assert!(clone.catalog().is_empty());
    }
}
