//! Error types for the lazy-load engine.
//!
//! Only two kinds of failure exist:
//!
//! - [`ConfigError`]: rejected options, reported when a session starts
//! - [`FetchError`]: an image could not be retrieved; the loader absorbs it
//!
//! [`LazyLoadError`] is the error returned from the public entry points.

use thiserror::Error;

/// Invalid or unparseable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The loader concurrency ceiling must allow at least one fetch.
    #[error("concurrent must be at least 1")]
    ZeroConcurrency,

    /// `on` did not name any event.
    #[error("no trigger events configured")]
    NoEvents,

    /// The candidate selector was empty.
    #[error("selector must not be empty")]
    EmptySelector,

    /// The source attribute name was empty.
    #[error("attribute must not be empty")]
    EmptyAttribute,

    /// The look-ahead threshold was not a finite number.
    #[error("threshold must be a finite number, got {0}")]
    InvalidThreshold(f64),

    /// The fade duration was negative or not finite.
    #[error("speed must be a finite, non-negative number of milliseconds, got {0}")]
    InvalidSpeed(f64),

    /// The options document could not be parsed.
    #[error("failed to parse options: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure to retrieve an image.
///
/// The loader treats every variant the same way: the slot is released and the
/// item is dropped. The variants exist for logging.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Http {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The body was retrieved but is not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

/// Errors returned when attaching lazy loading to a container.
#[derive(Debug, Error)]
pub enum LazyLoadError {
    /// The resolved configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
