//! Image fetch primitive.
//!
//! The loader only needs to know when an image has been retrieved, and
//! whether that succeeded. [`ImageFetcher`] is that seam:
//!
//! - [`HttpImageFetcher`]: `reqwest` download plus an `image` decode check
//! - [`MemoryFetcher`]: offline fetcher with fixed latency and scripted
//!   failures, used by the simulator and tests

mod http;
mod memory;

pub use http::HttpImageFetcher;
pub use memory::MemoryFetcher;

use std::future::Future;
use std::pin::Pin;

use crate::error::FetchError;

/// Future returned by [`ImageFetcher::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<(), FetchError>> + Send + 'a>>;

/// Retrieves an image by URL.
///
/// Implementations must always resolve: the loader holds a concurrency slot
/// until the future completes.
pub trait ImageFetcher: Send + Sync + 'static {
    /// Fetches the image at `url`.
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a>;
}
