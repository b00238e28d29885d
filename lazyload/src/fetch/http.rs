//! HTTP image fetcher.

use std::time::Duration;

use tracing::trace;

use super::{FetchFuture, ImageFetcher};
use crate::error::FetchError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches images over HTTP(S) with `reqwest`.
///
/// A response counts as loaded when the status is a success and, unless
/// disabled with [`HttpImageFetcher::without_decode`], the body decodes as an
/// image. Decoding runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    decode: bool,
}

impl HttpImageFetcher {
    /// Creates a fetcher with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a fetcher with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            decode: true,
        })
    }

    /// Accept any successful response without decoding the body.
    pub fn without_decode(mut self) -> Self {
        self.decode = false;
        self
    }

    async fn get(&self, url: &str) -> Result<(), FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        trace!(url, bytes = body.len(), "Image body received");

        if !self.decode {
            return Ok(());
        }

        tokio::task::spawn_blocking(move || image::load_from_memory(&body).map(|_| ()))
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(self.get(url))
    }
}
