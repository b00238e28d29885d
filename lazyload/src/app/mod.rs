//! Public entry point.
//!
//! [`LazyLoad`] owns the pieces shared by every container on a page and
//! starts one [`Session`](crate::session::Session) per attached container.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        LazyLoad                          │
//! │                                                          │
//! │  attach(container) ──► Session ──┐                       │
//! │  attach(container) ──► Session ──┼──► Loader (shared)    │
//! │  attach(container) ──► Session ──┘     ├── LoadQueue     │
//! │                                        └── ImageFetcher  │
//! │                                                          │
//! │  Host: geometry, attributes, events, visual swap         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use lazyload::{ElementRect, LazyLoad, LazyLoadOptions, MemoryFetcher, MemoryHost};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), lazyload::LazyLoadError> {
//! let host = Arc::new(MemoryHost::new());
//! let container = host.create_element(None, ElementRect::new(0.0, 0.0, 800.0, 600.0));
//!
//! let lazy = LazyLoad::new(host.clone(), Arc::new(MemoryFetcher::new(Duration::ZERO)));
//! let session = lazy.attach(container, &LazyLoadOptions::default())?;
//! assert!(!session.is_dormant());
//! # Ok(())
//! # }
//! ```

mod bootstrap;

pub use bootstrap::LazyLoad;
