//! Loader telemetry.
//!
//! Lock-free counters updated by the loader as items move through the queue
//! and fetches start and finish. [`LoaderMetrics::snapshot`] produces a
//! point-in-time copy for display.
//!
//! ```text
//! Loader ─────► LoaderMetrics ─────► LoaderSnapshot ─────► CLI summary
//!              (atomic counters)    (point-in-time copy)
//! ```

mod metrics;
mod snapshot;

pub use metrics::LoaderMetrics;
pub use snapshot::LoaderSnapshot;
