//! Host document abstraction.
//!
//! The engine never touches a real document. Everything it needs from the
//! page goes through [`Host`]: element geometry, attribute reads, namespaced
//! event binding and the visual swap of a loaded image.
//!
//! [`MemoryHost`] is an in-memory document used by the simulator and the
//! tests.

mod memory;

pub use memory::{ElementId, MemoryHost, SwapRecord};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::geometry::ElementRect;

/// Callback invoked when a bound event fires.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Capabilities the engine requires from the host document.
///
/// Implementations must not hold internal locks while invoking a
/// [`Listener`]: listeners re-enter the engine, which calls back into the
/// host.
pub trait Host: Send + Sync + 'static {
    /// Handle to an element of the document.
    type Element: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// Returns the element's current on-screen rectangle.
    fn bounding_rect(&self, element: &Self::Element) -> ElementRect;

    /// Returns descendants of `container` matching `selector`, in document
    /// order.
    fn query_selector_all(&self, container: &Self::Element, selector: &str) -> Vec<Self::Element>;

    /// Reads an attribute value.
    fn get_attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    /// Binds `listener` to `event` on `element` under `namespace`.
    fn bind(&self, element: &Self::Element, event: &str, namespace: &str, listener: Listener);

    /// Removes every listener bound on `element` under `namespace`.
    fn unbind(&self, element: &Self::Element, namespace: &str);

    /// Hides the element, points it at `src` and fades it in over `duration`.
    fn apply_visual_swap(&self, element: &Self::Element, src: &str, duration: Duration);
}
