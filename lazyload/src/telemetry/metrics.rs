//! Atomic loader counters.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use super::snapshot::LoaderSnapshot;

/// Counters describing loader activity.
#[derive(Debug, Default)]
pub struct LoaderMetrics {
    enqueued: AtomicU64,
    started: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    peak_in_flight: AtomicUsize,
}

impl LoaderMetrics {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `count` items added to the queue.
    pub fn items_enqueued(&self, count: usize) {
        self.enqueued.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Records a fetch start with the resulting in-flight count.
    pub fn fetch_started(&self, in_flight: usize) {
        self.started.fetch_add(1, Ordering::Relaxed);
        self.peak_in_flight.fetch_max(in_flight, Ordering::Relaxed);
    }

    /// Records a successful fetch.
    pub fn fetch_succeeded(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed fetch.
    pub fn fetch_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a point-in-time copy of the counters.
    pub fn snapshot(&self) -> LoaderSnapshot {
        LoaderSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            started: self.started.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            peak_in_flight: self.peak_in_flight.load(Ordering::Relaxed),
        }
    }
}
