//! Point-in-time view of loader counters.

use std::fmt;

/// Copy of the loader counters at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderSnapshot {
    /// Items added to the queue.
    pub enqueued: u64,
    /// Fetches started.
    pub started: u64,
    /// Fetches that completed successfully.
    pub succeeded: u64,
    /// Fetches that failed.
    pub failed: u64,
    /// Highest number of fetches in flight at once.
    pub peak_in_flight: usize,
}

impl LoaderSnapshot {
    /// Fetches that reached a terminal state.
    pub fn completed(&self) -> u64 {
        self.succeeded + self.failed
    }

    /// Fetches started but not yet completed.
    pub fn in_flight(&self) -> u64 {
        self.started.saturating_sub(self.completed())
    }
}

impl fmt::Display for LoaderSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "enqueued={} started={} succeeded={} failed={} peak_in_flight={}",
            self.enqueued, self.started, self.succeeded, self.failed, self.peak_in_flight
        )
    }
}
