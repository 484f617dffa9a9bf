//! Integration tests for Mjengo.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mjengo-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Cart engine scenarios against a loaded catalog
//! - `image_pipeline` - URL optimization plus preloading, end to end
//!
//! Everything runs in-process: the catalog is a JSON fixture and the
//! preloader is driven through a scripted fetcher, so no network or
//! external service is involved.

/// Install a tracing subscriber honoring `RUST_LOG`, writing through the
/// test harness so output stays attached to the owning test.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
