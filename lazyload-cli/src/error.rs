//! CLI error type.

use std::io;
use std::path::PathBuf;

use lazyload::logging::LoggingError;
use lazyload::{FetchError, LazyLoadError};
use thiserror::Error;

/// Errors surfaced to the user with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read layout {path}: {source}")]
    LayoutRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse layout: {0}")]
    LayoutParse(#[from] serde_json::Error),

    #[error("Invalid layout: {0}")]
    Layout(String),

    #[error(transparent)]
    LazyLoad(#[from] LazyLoadError),

    #[error("Failed to create HTTP fetcher: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to start runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("Failed to initialize logging: {0}")]
    Logging(#[from] LoggingError),
}
