//! Image pipeline end to end: URL optimization feeding the preloader.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mjengo_core::AssetId;
use mjengo_storefront::catalog::Catalog;
use mjengo_storefront::config::{CdnConfig, PreloadConfig, StorefrontConfig};
use mjengo_storefront::images::{
    FetchError, ImageFetcher, ImageOptimizer, LoadedImage, Preloader, Priority, Transform,
};
use mjengo_storefront::state::AppState;
use tokio::sync::Mutex;

const HERO: &str = "https://res.cloudinary.com/demo/image/upload/v1754409797/IBD2_eepz4h.jpg";
const EXCLUDED: &str =
    "https://res.cloudinary.com/demo/image/upload/f_auto,q_auto,w_400,c_scale/v1754056371/sssss_wyzyk0.webp";

/// Always-succeeding fetcher that records every requested URL.
#[derive(Default)]
struct RecordingFetcher {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageFetcher for RecordingFetcher {
    async fn fetch(&self, url: &str) -> Result<LoadedImage, FetchError> {
        self.calls.lock().await.push(url.to_string());
        Ok(LoadedImage {
            url: url.to_string(),
            content_type: Some("image/webp".to_string()),
            bytes: vec![0x52, 0x49, 0x46, 0x46],
        })
    }
}

fn cdn_excluding(assets: &[&str]) -> CdnConfig {
    CdnConfig {
        host: "res.cloudinary.com".to_string(),
        excluded_assets: assets.iter().copied().map(AssetId::new).collect::<HashSet<_>>(),
    }
}

#[test]
fn optimized_urls_are_stable_under_reoptimization() {
    let optimizer = ImageOptimizer::new(CdnConfig::default());
    let transform = Transform::product().width(800);

    let once = optimizer.optimize_url(HERO, &transform);
    let twice = optimizer.optimize_url(&once, &transform);

    assert_eq!(once, twice);
    assert_eq!(once.matches("f_auto").count(), 1);
    assert_eq!(once.matches("w_800").count(), 1);
}

#[test]
fn exclusion_list_silences_every_operation() {
    let optimizer = ImageOptimizer::new(cdn_excluding(&["sssss_wyzyk0"]));

    assert_eq!(
        optimizer.optimize_url(EXCLUDED, &Transform::product().width(1600)),
        EXCLUDED
    );
    assert_eq!(optimizer.card_image(EXCLUDED), EXCLUDED);
    assert_eq!(optimizer.modal_image(EXCLUDED), EXCLUDED);
    let sources = optimizer.picture_sources(EXCLUDED);
    assert_eq!(sources.fallback, EXCLUDED);
    assert!(sources.avif.split(", ").all(|entry| entry.starts_with(EXCLUDED)));
}

#[tokio::test(start_paused = true)]
async fn optimizer_output_feeds_the_preloader() {
    mjengo_integration_tests::init_tracing();
    let optimizer = ImageOptimizer::new(CdnConfig::default());
    let fetcher = Arc::new(RecordingFetcher::default());
    let preloader = Preloader::with_fetcher(
        &PreloadConfig { concurrency: 2 },
        Arc::clone(&fetcher) as Arc<dyn ImageFetcher>,
    );

    let card = optimizer.card_image(HERO);
    let pairs = optimizer.responsive_pairs(HERO, &[320, 640]);
    let mut urls = vec![card.clone()];
    urls.extend(pairs.into_iter().map(|(url, _)| url));

    preloader.enqueue(urls, Priority::Low).await;
    preloader.idle().await;

    assert!(preloader.is_loaded(&card));
    let stats = preloader.stats().await;
    assert_eq!(stats.cached_images, 3);
    assert_eq!(stats.queue_length, 0);

    // Every fetched URL carries a transformation segment.
    for url in fetcher.calls.lock().await.iter() {
        assert!(url.contains("/upload/f_"), "unoptimized fetch: {url}");
    }
}

#[tokio::test(start_paused = true)]
async fn app_state_warms_catalog_imagery() {
    mjengo_integration_tests::init_tracing();
    let catalog = Catalog::from_json(
        r#"[
            {
                "id": "ibd-600",
                "name": "Inverted Block Drainage",
                "description": "Edge drainage.",
                "category": "drainage",
                "unit": "per piece",
                "price": 0,
                "image": "https://res.cloudinary.com/demo/image/upload/v1/IBD2_eepz4h.jpg",
                "image2": "https://res.cloudinary.com/demo/image/upload/v1/IBD1_hgwpb7.jpg",
                "inStock": true
            }
        ]"#
        .as_bytes(),
    )
    .expect("fixture catalog must parse");

    let fetcher = Arc::new(RecordingFetcher::default());
    let state = AppState::with_fetcher(
        StorefrontConfig::default(),
        catalog,
        Arc::clone(&fetcher) as Arc<dyn ImageFetcher>,
    );
    state.warm_product_images().await;
    state.preloader().idle().await;

    let stats = state.preloader().stats().await;
    assert_eq!(stats.cached_images, 2);
    assert_eq!(stats.queue_length, 0);
    assert_eq!(stats.in_flight, 0);
    assert!(state
        .preloader()
        .is_loaded("https://res.cloudinary.com/demo/image/upload/v1/IBD2_eepz4h.jpg"));
}
