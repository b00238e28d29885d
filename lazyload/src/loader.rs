//! Concurrency-limited image loader.
//!
//! The loader owns the [`LoadQueue`] and a slot counter (`waiting`). Every
//! session attached to the same loader shares both, so the concurrency
//! ceiling applies across containers, not per container.
//!
//! # Fetch lifecycle
//!
//! ```text
//!  queued ──► in flight ──┬──► succeeded ──► swap, wait 50ms ──► drain
//!                          └──► failed ───────────────────────► drain
//! ```
//!
//! A fetch is never retried and never cancelled. Its slot is released on
//! either outcome before the next [`Loader::drain`].
//!
//! # Example
//!
//! ```ignore
//! use lazyload::loader::{DrainSettings, Loader};
//! use lazyload::queue::QueueItem;
//!
//! let loader = Arc::new(Loader::new(host, fetcher));
//! loader.enqueue_batch(vec![QueueItem::new(img, "https://example.com/a.jpg")]);
//! loader.drain(DrainSettings::default());
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::{DEFAULT_CONCURRENT, DEFAULT_SPEED_MS};
use crate::fetch::ImageFetcher;
use crate::host::Host;
use crate::queue::{LoadQueue, QueueItem};
use crate::telemetry::{LoaderMetrics, LoaderSnapshot};

/// Delay between a successful swap and the next drain.
pub const REDRAIN_DELAY: Duration = Duration::from_millis(50);

/// Per-call loader parameters, taken from the caller's configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrainSettings {
    /// Maximum number of fetches in flight.
    pub concurrent: usize,
    /// Fade-in duration passed to the host on success.
    pub speed: Duration,
}

impl Default for DrainSettings {
    fn default() -> Self {
        Self {
            concurrent: DEFAULT_CONCURRENT,
            speed: Duration::from_millis(DEFAULT_SPEED_MS),
        }
    }
}

#[derive(Debug)]
struct LoaderState<E> {
    queue: LoadQueue<E>,
    waiting: usize,
}

/// Drains the load queue with a bounded number of concurrent fetches.
pub struct Loader<H: Host, F: ImageFetcher> {
    host: Arc<H>,
    fetcher: Arc<F>,
    state: Mutex<LoaderState<H::Element>>,
    metrics: LoaderMetrics,
}

impl<H: Host, F: ImageFetcher> Loader<H, F> {
    /// Creates an idle loader.
    pub fn new(host: Arc<H>, fetcher: Arc<F>) -> Self {
        Self {
            host,
            fetcher,
            state: Mutex::new(LoaderState {
                queue: LoadQueue::new(),
                waiting: 0,
            }),
            metrics: LoaderMetrics::new(),
        }
    }

    /// Queues a batch ahead of older items.
    pub fn enqueue_batch(&self, batch: Vec<QueueItem<H::Element>>) {
        if batch.is_empty() {
            return;
        }
        let count = batch.len();
        self.state.lock().queue.enqueue_batch(batch);
        self.metrics.items_enqueued(count);
        trace!(count, "Batch enqueued");
    }

    /// Starts fetches for queued items while slots are free.
    ///
    /// Returns immediately when all `settings.concurrent` slots are taken or
    /// the queue is empty. Otherwise dequeues up to the number of free slots
    /// and spawns one fetch per item. Must be called from within a Tokio
    /// runtime.
    ///
    /// Returns the number of fetches started.
    pub fn drain(self: &Arc<Self>, settings: DrainSettings) -> usize {
        let started: Vec<QueueItem<H::Element>> = {
            let mut state = self.state.lock();
            if state.waiting >= settings.concurrent {
                trace!(waiting = state.waiting, "All slots busy");
                return 0;
            }

            let mut started = Vec::new();
            for _ in 0..settings.concurrent {
                if state.waiting >= settings.concurrent {
                    break;
                }
                let Some(item) = state.queue.dequeue_one() else {
                    break;
                };
                state.waiting += 1;
                self.metrics.fetch_started(state.waiting);
                started.push(item);
            }
            started
        };

        let count = started.len();
        for item in started {
            self.spawn_fetch(item, settings);
        }
        count
    }

    fn spawn_fetch(self: &Arc<Self>, item: QueueItem<H::Element>, settings: DrainSettings) {
        debug!(element = ?item.element, src = %item.src, "Fetch started");

        let loader = Arc::clone(self);
        tokio::spawn(async move {
            let result = loader.fetcher.fetch(&item.src).await;
            loader.release_slot();

            match result {
                Ok(()) => {
                    loader.metrics.fetch_succeeded();
                    debug!(element = ?item.element, src = %item.src, "Image loaded");
                    loader
                        .host
                        .apply_visual_swap(&item.element, &item.src, settings.speed);

                    tokio::time::sleep(REDRAIN_DELAY).await;
                    loader.drain(settings);
                }
                Err(e) => {
                    loader.metrics.fetch_failed();
                    debug!(element = ?item.element, src = %item.src, error = %e, "Image failed to load");
                    loader.drain(settings);
                }
            }
        });
    }

    fn release_slot(&self) {
        let mut state = self.state.lock();
        state.waiting = state.waiting.saturating_sub(1);
    }

    /// Number of fetches currently in flight.
    pub fn in_flight(&self) -> usize {
        self.state.lock().waiting
    }

    /// Number of items waiting in the queue.
    pub fn queued(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Returns true when nothing is queued or in flight.
    pub fn is_idle(&self) -> bool {
        let state = self.state.lock();
        state.waiting == 0 && state.queue.is_empty()
    }

    /// Drops every queued item that has not started. In-flight fetches run
    /// to completion.
    pub fn clear_queue(&self) -> usize {
        self.state.lock().queue.clear()
    }

    /// Current loader counters.
    pub fn metrics(&self) -> LoaderSnapshot {
        self.metrics.snapshot()
    }

    /// The host swaps are applied to.
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }
}

impl<H: Host, F: ImageFetcher> std::fmt::Debug for Loader<H, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Loader")
            .field("waiting", &state.waiting)
            .field("queued", &state.queue.len())
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;
    use crate::geometry::ElementRect;
    use crate::host::{ElementId, MemoryHost};

    const LATENCY: Duration = Duration::from_millis(100);

    struct Fixture {
        host: Arc<MemoryHost>,
        fetcher: Arc<MemoryFetcher>,
        loader: Arc<Loader<MemoryHost, MemoryFetcher>>,
    }

    fn fixture(fetcher: MemoryFetcher) -> Fixture {
        let host = Arc::new(MemoryHost::new());
        let fetcher = Arc::new(fetcher);
        let loader = Arc::new(Loader::new(host.clone(), fetcher.clone()));
        Fixture {
            host,
            fetcher,
            loader,
        }
    }

    fn items(host: &MemoryHost, names: &[&str]) -> Vec<QueueItem<ElementId>> {
        names
            .iter()
            .map(|name| {
                let id = host.create_element(None, ElementRect::default());
                QueueItem::new(id, format!("{}.png", name))
            })
            .collect()
    }

    fn settings(concurrent: usize) -> DrainSettings {
        DrainSettings {
            concurrent,
            speed: Duration::from_millis(50),
        }
    }

    /// Lets spawned tasks run up to their next timer.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_empty_queue_is_noop() {
        let f = fixture(MemoryFetcher::new(LATENCY));

        assert_eq!(f.loader.drain(settings(5)), 0);
        assert_eq!(f.loader.in_flight(), 0);
        assert_eq!(f.loader.metrics(), LoaderSnapshot::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_with_full_slots_is_noop() {
        let f = fixture(MemoryFetcher::new(LATENCY));
        f.loader.enqueue_batch(items(&f.host, &["a", "b", "c"]));

        assert_eq!(f.loader.drain(settings(2)), 2);
        assert_eq!(f.loader.drain(settings(2)), 0);
        assert_eq!(f.loader.in_flight(), 2);
        assert_eq!(f.loader.queued(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_starts_only_free_slots() {
        let f = fixture(MemoryFetcher::new(LATENCY));
        f.loader.enqueue_batch(items(&f.host, &["a"]));
        assert_eq!(f.loader.drain(settings(3)), 1);

        f.loader.enqueue_batch(items(&f.host, &["b", "c", "d", "e"]));
        assert_eq!(f.loader.drain(settings(3)), 2);
        assert_eq!(f.loader.in_flight(), 3);
        assert_eq!(f.loader.queued(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_swaps_and_releases_slot() {
        let f = fixture(MemoryFetcher::new(LATENCY));
        let batch = items(&f.host, &["a", "b"]);
        let elements: Vec<ElementId> = batch.iter().map(|i| i.element).collect();
        f.loader.enqueue_batch(batch);
        f.loader.drain(settings(5));

        tokio::time::sleep(LATENCY + Duration::from_millis(1)).await;
        settle().await;

        assert_eq!(f.loader.in_flight(), 0);
        assert_eq!(f.host.src(elements[0]), Some("a.png".to_string()));
        assert_eq!(f.host.src(elements[1]), Some("b.png".to_string()));

        let swaps = f.host.swaps();
        assert_eq!(swaps.len(), 2);
        assert!(swaps.iter().all(|s| s.duration == Duration::from_millis(50)));
        assert_eq!(f.loader.metrics().succeeded, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_dropped_and_drains_immediately() {
        let f = fixture(MemoryFetcher::new(LATENCY).failing("bad.png"));
        f.loader.enqueue_batch(items(&f.host, &["bad", "next"]));
        f.loader.drain(settings(1));

        // The failure releases its slot and the next item starts without the
        // post-success delay.
        tokio::time::sleep(LATENCY + Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(f.fetcher.requested(), vec!["bad.png", "next.png"]);
        assert_eq!(f.loader.in_flight(), 1);

        tokio::time::sleep(LATENCY).await;
        settle().await;

        let snapshot = f.loader.metrics();
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.succeeded, 1);
        assert_eq!(f.host.swaps().len(), 1);
        assert_eq!(f.host.swaps()[0].src, "next.png");
        assert!(f.loader.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_redrains_after_delay() {
        let f = fixture(MemoryFetcher::new(LATENCY));
        f.loader.enqueue_batch(items(&f.host, &["a", "b"]));
        f.loader.drain(settings(1));

        tokio::time::sleep(LATENCY + Duration::from_millis(1)).await;
        settle().await;
        // First done, second waits for the re-drain delay.
        assert_eq!(f.fetcher.requested(), vec!["a.png"]);
        assert_eq!(f.loader.queued(), 1);

        tokio::time::sleep(REDRAIN_DELAY).await;
        settle().await;
        assert_eq!(f.fetcher.requested(), vec!["a.png", "b.png"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_one_serializes() {
        let f = fixture(MemoryFetcher::new(LATENCY));
        f.loader.enqueue_batch(items(&f.host, &["a", "b", "c"]));
        f.loader.drain(settings(1));

        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;

        assert_eq!(f.fetcher.peak_in_flight(), 1);
        assert_eq!(f.loader.metrics().peak_in_flight, 1);
        assert_eq!(f.fetcher.completed(), vec!["a.png", "b.png", "c.png"]);
        assert!(f.loader.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ceiling_holds_under_load() {
        let f = fixture(MemoryFetcher::new(LATENCY));
        let names: Vec<String> = (0..20).map(|i| format!("img{}", i)).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        f.loader.enqueue_batch(items(&f.host, &names));

        for _ in 0..5 {
            f.loader.drain(settings(4));
        }

        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;

        assert_eq!(f.fetcher.peak_in_flight(), 4);
        assert_eq!(f.loader.metrics().succeeded, 20);
        assert!(f.loader.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_queue_keeps_in_flight() {
        let f = fixture(MemoryFetcher::new(LATENCY));
        f.loader.enqueue_batch(items(&f.host, &["a", "b", "c"]));
        f.loader.drain(settings(1));

        assert_eq!(f.loader.clear_queue(), 2);
        assert_eq!(f.loader.in_flight(), 1);

        tokio::time::sleep(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(f.fetcher.completed(), vec!["a.png"]);
    }
}
