//! lazyload - deferred image loading for scrollable containers
//!
//! Images inside a container carry their real URL in an attribute. The
//! engine watches the container's events, works out which images have
//! scrolled into view, and fetches them through a shared queue that caps how
//! many downloads run at once. Each loaded image is swapped in with a fade.
//!
//! # Modules
//!
//! - [`geometry`]: element boxes and the visibility test
//! - [`scanner`]: partitions candidates into visible and pending
//! - [`queue`]: batch-ordered load queue
//! - [`loader`]: concurrency-limited queue drain
//! - [`trigger`]: event debouncing
//! - [`session`]: per-container lifecycle
//! - [`app`]: [`LazyLoad`], the entry point
//! - [`host`] and [`fetch`]: seams to the document and the network
//!
//! # Runtime
//!
//! Timers and fetches run as Tokio tasks; attach containers from within a
//! Tokio runtime.

pub mod app;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geometry;
pub mod host;
pub mod loader;
pub mod logging;
pub mod queue;
pub mod scanner;
pub mod session;
pub mod telemetry;
pub mod trigger;

pub use app::LazyLoad;
pub use config::{LazyLoadConfig, LazyLoadOptions};
pub use error::{ConfigError, FetchError, LazyLoadError};
pub use fetch::{HttpImageFetcher, ImageFetcher, MemoryFetcher};
pub use geometry::{ElementRect, ViewportBox};
pub use host::{ElementId, Host, MemoryHost};
pub use loader::{DrainSettings, Loader};
pub use session::{Recalculation, Session};
pub use telemetry::LoaderSnapshot;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
