//! Debounced trigger scheduling.
//!
//! Viewport events arrive in bursts (a scroll produces dozens). A
//! [`Debouncer`] holds at most one pending timer: every new event aborts the
//! pending one and starts a fresh delay, so the action runs once, after the
//! burst has been quiet for the full delay.
//!
//! Each scheduled timer carries a generation number. When the timer fires,
//! the owner passes that generation back to [`Debouncer::settle`], which only
//! accepts the most recent one. A timer that already woke up but lost the
//! race against a newer event is ignored.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// Quiet period before a recalculation runs.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(200);

/// A single cancellable timer slot.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    /// Creates a debouncer with [`DEBOUNCE_DELAY`].
    pub fn with_default_delay() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }

    /// Cancels any pending timer and schedules `action` after the delay.
    ///
    /// `action` receives the generation of this schedule call. Must be
    /// called from within a Tokio runtime.
    pub fn schedule<A>(&mut self, action: A) -> u64
    where
        A: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action(generation);
        }));

        trace!(generation, delay_ms = delay.as_millis() as u64, "Debounce scheduled");
        generation
    }

    /// Marks the timer of `generation` as fired.
    ///
    /// Returns false if a newer schedule or a cancel superseded it, in which
    /// case the caller must not run its action.
    pub fn settle(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.pending.is_none() {
            return false;
        }
        self.pending = None;
        true
    }

    /// Aborts the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
            trace!(generation = self.generation, "Debounce cancelled");
        }
    }

    /// Returns true while a timer is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The configured quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Fired = Arc<Mutex<Vec<u64>>>;

    fn recorder(fired: &Fired) -> impl FnOnce(u64) + Send + 'static {
        let fired = fired.clone();
        move |generation| fired.lock().push(generation)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let fired: Fired = Arc::default();
        let mut debouncer = Debouncer::new(Duration::from_millis(200));

        let generation = debouncer.schedule(recorder(&fired));
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(199)).await;
        assert!(fired.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*fired.lock(), vec![generation]);
        assert!(debouncer.settle(generation));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_once() {
        let fired: Fired = Arc::default();
        let mut debouncer = Debouncer::new(Duration::from_millis(200));

        let mut last = 0;
        for _ in 0..5 {
            last = debouncer.schedule(recorder(&fired));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(*fired.lock(), vec![last]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        let fired: Fired = Arc::default();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));

        let generation = debouncer.schedule(recorder(&fired));
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(fired.lock().is_empty());
        assert!(!debouncer.settle(generation));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_is_rejected() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));

        let first = debouncer.schedule(|_| {});
        let second = debouncer.schedule(|_| {});

        assert!(!debouncer.settle(first));
        assert!(debouncer.settle(second));
        assert!(!debouncer.settle(second));
    }

    #[test]
    fn test_default_delay() {
        assert_eq!(Debouncer::with_default_delay().delay(), Duration::from_millis(200));
    }
}
