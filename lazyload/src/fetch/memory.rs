//! Offline fetcher with fixed latency.

use std::collections::HashSet;
use std::time::Duration;

use parking_lot::Mutex;

use super::{FetchFuture, ImageFetcher};
use crate::error::FetchError;

#[derive(Debug, Default)]
struct FetchLog {
    in_flight: usize,
    peak_in_flight: usize,
    requested: Vec<String>,
    completed: Vec<String>,
}

/// Fetcher that never touches the network.
///
/// Every fetch waits `latency` on the Tokio timer and then succeeds, unless
/// its URL was registered with [`MemoryFetcher::failing`], in which case it
/// fails with a 404. The fetcher records what was requested and how many
/// fetches overlapped.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    latency: Duration,
    failing: HashSet<String>,
    log: Mutex<FetchLog>,
}

impl MemoryFetcher {
    /// Creates a fetcher whose fetches take `latency`.
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Default::default()
        }
    }

    /// Makes fetches of `url` fail.
    pub fn failing(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    /// URLs in the order their fetches started.
    pub fn requested(&self) -> Vec<String> {
        self.log.lock().requested.clone()
    }

    /// URLs in the order their fetches finished.
    pub fn completed(&self) -> Vec<String> {
        self.log.lock().completed.clone()
    }

    /// Fetches currently waiting on their latency.
    pub fn in_flight(&self) -> usize {
        self.log.lock().in_flight
    }

    /// Highest number of overlapping fetches seen.
    pub fn peak_in_flight(&self) -> usize {
        self.log.lock().peak_in_flight
    }

    async fn run(&self, url: &str) -> Result<(), FetchError> {
        {
            let mut log = self.log.lock();
            log.in_flight += 1;
            log.peak_in_flight = log.peak_in_flight.max(log.in_flight);
            log.requested.push(url.to_string());
        }

        tokio::time::sleep(self.latency).await;

        {
            let mut log = self.log.lock();
            log.in_flight -= 1;
            log.completed.push(url.to_string());
        }

        if self.failing.contains(url) {
            Err(FetchError::Http {
                status: 404,
                url: url.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl ImageFetcher for MemoryFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(self.run(url))
    }
}
