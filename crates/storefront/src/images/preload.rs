//! Image preload pipeline.
//!
//! A best-effort prefetch queue that warms an in-memory image cache ahead
//! of rendering. URLs are queued with a priority, a single background
//! drain task starts loads as concurrency slots free up, and every
//! completion - success or failure - is terminal: failed loads are logged
//! and never retried, and nothing is ever propagated to the caller. The
//! rendering layer falls back to a placeholder on its own; this pipeline
//! only reduces perceived latency.
//!
//! The loaded-image cache grows monotonically for the life of the process
//! (no eviction); [`Preloader::clear`] is the only way to release it.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use tokio::sync::{Mutex, Notify, Semaphore};

use crate::config::PreloadConfig;

/// A fetched image held in the preload cache.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub url: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Image fetch errors. Contained inside the pipeline - callers never see
/// these.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
}

/// The fetch seam: how a queued URL becomes image bytes.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<LoadedImage, FetchError>;
}

/// Default fetcher backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<LoadedImage, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();
        Ok(LoadedImage {
            url: url.to_string(),
            content_type,
            bytes,
        })
    }
}

/// Queue position for newly enqueued URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Head of the queue - above-the-fold imagery.
    High,
    /// Tail of the queue.
    Low,
}

/// Point-in-time pipeline counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreloadStats {
    /// Images held in the loaded cache.
    pub cached_images: u64,
    /// URLs waiting in the pending queue.
    pub queue_length: usize,
    /// Loads currently running.
    pub in_flight: usize,
}

/// The preload pipeline.
///
/// Cheaply cloneable; clones share the cache, the pending queue, and the
/// concurrency budget.
#[derive(Clone)]
pub struct Preloader {
    inner: Arc<PreloaderInner>,
}

struct PreloaderInner {
    cache: Cache<String, Arc<LoadedImage>>,
    pending: Mutex<PendingQueue>,
    permits: Arc<Semaphore>,
    settled: Notify,
    fetcher: Arc<dyn ImageFetcher>,
}

struct PendingQueue {
    deque: VecDeque<String>,
    /// URLs pending or in flight; keeps re-enqueues out until completion.
    queued: HashSet<String>,
    draining: bool,
    in_flight: usize,
}

impl Preloader {
    /// Create a preloader with the default HTTP fetcher.
    #[must_use]
    pub fn new(config: &PreloadConfig) -> Self {
        Self::with_fetcher(config, Arc::new(HttpFetcher::new()))
    }

    /// Create a preloader with a custom fetcher (tests, alternative
    /// transports).
    #[must_use]
    pub fn with_fetcher(config: &PreloadConfig, fetcher: Arc<dyn ImageFetcher>) -> Self {
        let concurrency = config.concurrency.max(1);
        Self {
            inner: Arc::new(PreloaderInner {
                cache: Cache::builder().build(),
                pending: Mutex::new(PendingQueue {
                    deque: VecDeque::new(),
                    queued: HashSet::new(),
                    draining: false,
                    in_flight: 0,
                }),
                permits: Arc::new(Semaphore::new(concurrency)),
                settled: Notify::new(),
                fetcher,
            }),
        }
    }

    /// Queue URLs for background loading.
    ///
    /// URLs already loaded, already pending, or currently in flight are
    /// skipped. High priority pushes to the head of the queue, low to the
    /// tail. Once queued, a URL cannot be removed.
    pub async fn enqueue<I, S>(&self, urls: I, priority: Priority)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut queue = self.inner.pending.lock().await;
        for url in urls {
            let url = url.into();
            if self.inner.cache.contains_key(&url) || !queue.queued.insert(url.clone()) {
                continue;
            }
            match priority {
                Priority::High => queue.deque.push_front(url),
                Priority::Low => queue.deque.push_back(url),
            }
        }

        if !queue.deque.is_empty() && !queue.draining {
            queue.draining = true;
            drop(queue);
            let this = self.clone();
            tokio::spawn(async move {
                this.drain().await;
            });
        }
    }

    /// Immediately queue above-the-fold imagery at high priority.
    pub async fn preload_critical<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enqueue(urls, Priority::High).await;
    }

    /// Drain loop: one load per free concurrency slot until the queue is
    /// empty. Runs as a background task; exits when there is nothing left
    /// to start.
    async fn drain(&self) {
        loop {
            // Wait for a free slot before claiming the next URL, so the
            // queue keeps its order while loads are saturated.
            let Ok(permit) = Arc::clone(&self.inner.permits).acquire_owned().await else {
                return;
            };

            let url = {
                let mut queue = self.inner.pending.lock().await;
                match queue.deque.pop_front() {
                    Some(url) => {
                        queue.in_flight += 1;
                        url
                    }
                    None => {
                        queue.draining = false;
                        if queue.in_flight == 0 {
                            self.inner.settled.notify_waiters();
                        }
                        return;
                    }
                }
            };

            let this = self.clone();
            tokio::spawn(async move {
                this.load(&url).await;
                let mut queue = this.inner.pending.lock().await;
                queue.in_flight -= 1;
                queue.queued.remove(&url);
                let settled = queue.deque.is_empty() && queue.in_flight == 0;
                drop(queue);
                drop(permit);
                if settled {
                    this.inner.settled.notify_waiters();
                }
            });
        }
    }

    /// Load one URL into the cache. Failures are terminal: logged, not
    /// retried, not propagated.
    async fn load(&self, url: &str) {
        if self.inner.cache.contains_key(url) {
            return;
        }
        match self.inner.fetcher.fetch(url).await {
            Ok(image) => {
                tracing::debug!(url, bytes = image.bytes.len(), "Image preloaded");
                self.inner
                    .cache
                    .insert(url.to_string(), Arc::new(image))
                    .await;
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Image preload failed");
            }
        }
    }

    /// Whether a URL has been loaded (or at least attempted and cached).
    #[must_use]
    pub fn is_loaded(&self, url: &str) -> bool {
        self.inner.cache.contains_key(url)
    }

    /// Fetch a loaded image from the cache, if present.
    pub async fn get(&self, url: &str) -> Option<Arc<LoadedImage>> {
        self.inner.cache.get(url).await
    }

    /// Point-in-time counters for diagnostics.
    pub async fn stats(&self) -> PreloadStats {
        self.inner.cache.run_pending_tasks().await;
        let queue = self.inner.pending.lock().await;
        PreloadStats {
            cached_images: self.inner.cache.entry_count(),
            queue_length: queue.deque.len(),
            in_flight: queue.in_flight,
        }
    }

    /// Drop every cached image to free memory. The pending queue is
    /// unaffected.
    pub async fn clear(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    /// Wait until the pending queue is empty and no loads are in flight.
    pub async fn idle(&self) {
        loop {
            let notified = self.inner.settled.notified();
            tokio::pin!(notified);
            // Register interest before checking, so a completion between
            // the check and the await is not missed.
            notified.as_mut().enable();
            {
                let queue = self.inner.pending.lock().await;
                if queue.deque.is_empty() && queue.in_flight == 0 {
                    return;
                }
            }
            notified.await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scripted fetcher: succeeds unless the URL contains "fail", records
    /// call order, and tracks the peak number of concurrent fetches.
    #[derive(Default)]
    struct ScriptedFetcher {
        calls: Mutex<Vec<String>>,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ImageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> Result<LoadedImage, FetchError> {
            self.calls.lock().await.push(url.to_string());
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(active, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            if url.contains("fail") {
                Err(FetchError::Status(404))
            } else {
                Ok(LoadedImage {
                    url: url.to_string(),
                    content_type: Some("image/jpeg".to_string()),
                    bytes: vec![0xFF, 0xD8],
                })
            }
        }
    }

    fn preloader(concurrency: usize) -> (Preloader, Arc<ScriptedFetcher>) {
        let fetcher = Arc::new(ScriptedFetcher::default());
        let preloader = Preloader::with_fetcher(
            &PreloadConfig { concurrency },
            Arc::clone(&fetcher) as Arc<dyn ImageFetcher>,
        );
        (preloader, fetcher)
    }

    #[tokio::test(start_paused = true)]
    async fn test_enqueue_loads_into_cache() {
        let (preloader, _) = preloader(3);
        preloader
            .enqueue(["https://cdn/a.jpg", "https://cdn/b.jpg"], Priority::Low)
            .await;
        preloader.idle().await;

        assert!(preloader.is_loaded("https://cdn/a.jpg"));
        assert!(preloader.is_loaded("https://cdn/b.jpg"));
        let image = preloader.get("https://cdn/a.jpg").await.unwrap();
        assert_eq!(image.content_type.as_deref(), Some("image/jpeg"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicates_are_skipped() {
        let (preloader, fetcher) = preloader(3);
        preloader
            .enqueue(["https://cdn/a.jpg", "https://cdn/a.jpg"], Priority::Low)
            .await;
        preloader.idle().await;
        preloader.enqueue(["https://cdn/a.jpg"], Priority::Low).await;
        preloader.idle().await;

        assert_eq!(fetcher.calls.lock().await.len(), 1);
        assert_eq!(preloader.stats().await.cached_images, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_is_bounded() {
        let (preloader, fetcher) = preloader(3);
        let urls: Vec<String> = (0..12).map(|i| format!("https://cdn/{i}.jpg")).collect();
        preloader.enqueue(urls, Priority::Low).await;
        preloader.idle().await;

        assert!(fetcher.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(preloader.stats().await.cached_images, 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_high_priority_jumps_the_queue() {
        let (preloader, fetcher) = preloader(1);
        preloader
            .enqueue(["https://cdn/low1.jpg", "https://cdn/low2.jpg"], Priority::Low)
            .await;
        preloader
            .enqueue(["https://cdn/hero.jpg"], Priority::High)
            .await;
        preloader.idle().await;

        let calls = fetcher.calls.lock().await.clone();
        // The first low-priority load may already be in flight; the hero
        // must come no later than second.
        let hero_pos = calls.iter().position(|u| u == "https://cdn/hero.jpg").unwrap();
        assert!(hero_pos <= 1, "hero loaded at position {hero_pos}: {calls:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_terminal_and_contained() {
        let (preloader, fetcher) = preloader(2);
        preloader
            .enqueue(
                ["https://cdn/fail.jpg", "https://cdn/ok.jpg"],
                Priority::Low,
            )
            .await;
        preloader.idle().await;

        // The failed URL is not cached, not retried, and did not block the
        // rest of the queue.
        assert!(!preloader.is_loaded("https://cdn/fail.jpg"));
        assert!(preloader.is_loaded("https://cdn/ok.jpg"));
        let attempts = fetcher
            .calls
            .lock()
            .await
            .iter()
            .filter(|u| u.contains("fail"))
            .count();
        assert_eq!(attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_url_can_be_requeued_later() {
        // Terminal per attempt: the pipeline itself never retries, but a
        // later enqueue is a fresh attempt.
        let (preloader, fetcher) = preloader(1);
        preloader.enqueue(["https://cdn/fail.jpg"], Priority::Low).await;
        preloader.idle().await;
        preloader.enqueue(["https://cdn/fail.jpg"], Priority::Low).await;
        preloader.idle().await;

        assert_eq!(fetcher.calls.lock().await.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preload_critical_and_stats() {
        let (preloader, _) = preloader(2);
        assert_eq!(preloader.stats().await, PreloadStats::default());

        preloader
            .preload_critical(["https://cdn/hero.jpg", "https://cdn/hero2.jpg"])
            .await;
        preloader.idle().await;

        let stats = preloader.stats().await;
        assert_eq!(stats.cached_images, 2);
        assert_eq!(stats.queue_length, 0);
        assert_eq!(stats.in_flight, 0);

        // A later low-priority enqueue of an already-warm URL is a no-op.
        preloader
            .enqueue(["https://cdn/hero.jpg"], Priority::Low)
            .await;
        preloader.idle().await;
        assert_eq!(preloader.stats().await.cached_images, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_releases_cache() {
        let (preloader, _) = preloader(2);
        preloader.enqueue(["https://cdn/a.jpg"], Priority::Low).await;
        preloader.idle().await;
        assert!(preloader.is_loaded("https://cdn/a.jpg"));

        preloader.clear().await;
        assert!(!preloader.is_loaded("https://cdn/a.jpg"));
        assert_eq!(preloader.stats().await.cached_images, 0);
    }
}
