//! In-memory host document.
//!
//! A flat arena of elements with parent links, attributes and fixed
//! rectangles. Scrolling is simulated by translating descendants of a
//! container. Selectors are limited to `*`, `[name]` and `[name=value]`.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::warn;

use super::{Host, Listener};
use crate::geometry::ElementRect;

/// Index of an element in a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    /// Returns the raw arena index.
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A visual swap applied by the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapRecord {
    pub element: ElementId,
    pub src: String,
    pub duration: Duration,
}

#[derive(Debug, Default)]
struct Node {
    parent: Option<ElementId>,
    rect: ElementRect,
    attributes: HashMap<String, String>,
    src: Option<String>,
}

struct Binding {
    element: ElementId,
    event: String,
    namespace: String,
    listener: Listener,
}

#[derive(Default)]
struct Document {
    nodes: Vec<Node>,
    bindings: Vec<Binding>,
    swaps: Vec<SwapRecord>,
}

impl Document {
    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    fn is_descendant(&self, id: ElementId, ancestor: ElementId) -> bool {
        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.node(parent).and_then(|n| n.parent);
        }
        false
    }
}

/// Parsed form of the supported selectors.
#[derive(Debug, PartialEq)]
enum Selector {
    Any,
    Attribute { name: String, value: Option<String> },
}

impl Selector {
    fn parse(selector: &str) -> Option<Self> {
        let selector = selector.trim();
        if selector == "*" {
            return Some(Self::Any);
        }

        let inner = selector.strip_prefix('[')?.strip_suffix(']')?;
        let (name, value) = match inner.split_once('=') {
            Some((name, value)) => {
                let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                (name.trim(), Some(value.to_string()))
            }
            None => (inner.trim(), None),
        };

        if name.is_empty() {
            return None;
        }
        Some(Self::Attribute {
            name: name.to_string(),
            value,
        })
    }

    fn matches(&self, node: &Node) -> bool {
        match self {
            Self::Any => true,
            Self::Attribute { name, value } => match (node.attributes.get(name), value) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
                (None, _) => false,
            },
        }
    }
}

/// In-memory [`Host`] implementation.
#[derive(Default)]
pub struct MemoryHost {
    document: Mutex<Document>,
}

impl MemoryHost {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an element under `parent` (or as a root) and returns its id.
    pub fn create_element(&self, parent: Option<ElementId>, rect: ElementRect) -> ElementId {
        let mut doc = self.document.lock();
        let id = ElementId(doc.nodes.len() as u32);
        doc.nodes.push(Node {
            parent,
            rect,
            ..Default::default()
        });
        id
    }

    /// Sets an attribute value.
    pub fn set_attribute(&self, element: ElementId, name: &str, value: &str) {
        if let Some(node) = self.document.lock().node_mut(element) {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    /// Replaces an element's rectangle.
    pub fn set_rect(&self, element: ElementId, rect: ElementRect) {
        if let Some(node) = self.document.lock().node_mut(element) {
            node.rect = rect;
        }
    }

    /// Moves every descendant of `container` by the given offsets.
    ///
    /// Scrolling a container down by `n` pixels is `scroll_content(c, 0.0, -n)`.
    pub fn scroll_content(&self, container: ElementId, dx: f64, dy: f64) {
        let mut doc = self.document.lock();
        let descendants: Vec<usize> = (0..doc.nodes.len())
            .filter(|&i| doc.is_descendant(ElementId(i as u32), container))
            .collect();
        for index in descendants {
            let node = &mut doc.nodes[index];
            node.rect = node.rect.translated(dx, dy);
        }
    }

    /// Fires `event` on `element`, invoking every bound listener.
    ///
    /// Returns the number of listeners invoked.
    pub fn fire(&self, element: ElementId, event: &str) -> usize {
        let listeners: Vec<Listener> = {
            let doc = self.document.lock();
            doc.bindings
                .iter()
                .filter(|b| b.element == element && b.event == event)
                .map(|b| b.listener.clone())
                .collect()
        };

        for listener in &listeners {
            listener();
        }
        listeners.len()
    }

    /// Number of listeners currently bound on `element`.
    pub fn listener_count(&self, element: ElementId) -> usize {
        self.document
            .lock()
            .bindings
            .iter()
            .filter(|b| b.element == element)
            .count()
    }

    /// The source currently displayed by `element`, if it was swapped.
    pub fn src(&self, element: ElementId) -> Option<String> {
        self.document.lock().node(element).and_then(|n| n.src.clone())
    }

    /// Every swap applied so far, in order.
    pub fn swaps(&self) -> Vec<SwapRecord> {
        self.document.lock().swaps.clone()
    }
}

impl fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.document.lock();
        f.debug_struct("MemoryHost")
            .field("elements", &doc.nodes.len())
            .field("bindings", &doc.bindings.len())
            .field("swaps", &doc.swaps.len())
            .finish()
    }
}

impl Host for MemoryHost {
    type Element = ElementId;

    fn bounding_rect(&self, element: &ElementId) -> ElementRect {
        self.document
            .lock()
            .node(*element)
            .map(|n| n.rect)
            .unwrap_or_default()
    }

    fn query_selector_all(&self, container: &ElementId, selector: &str) -> Vec<ElementId> {
        let Some(parsed) = Selector::parse(selector) else {
            warn!(selector, "Unsupported selector, matching nothing");
            return Vec::new();
        };

        let doc = self.document.lock();
        doc.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (ElementId(i as u32), node))
            .filter(|(id, node)| doc.is_descendant(*id, *container) && parsed.matches(node))
            .map(|(id, _)| id)
            .collect()
    }

    fn get_attribute(&self, element: &ElementId, name: &str) -> Option<String> {
        self.document
            .lock()
            .node(*element)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    fn bind(&self, element: &ElementId, event: &str, namespace: &str, listener: Listener) {
        self.document.lock().bindings.push(Binding {
            element: *element,
            event: event.to_string(),
            namespace: namespace.to_string(),
            listener,
        });
    }

    fn unbind(&self, element: &ElementId, namespace: &str) {
        // Listeners are dropped after the lock is released.
        let removed: Vec<Binding> = {
            let mut doc = self.document.lock();
            let (removed, kept): (Vec<Binding>, Vec<Binding>) = std::mem::take(&mut doc.bindings)
                .into_iter()
                .partition(|b| b.element == *element && b.namespace == namespace);
            doc.bindings = kept;
            removed
        };
        drop(removed);
    }

    fn apply_visual_swap(&self, element: &ElementId, src: &str, duration: Duration) {
        let mut doc = self.document.lock();
        if let Some(node) = doc.node_mut(*element) {
            node.src = Some(src.to_string());
        }
        doc.swaps.push(SwapRecord {
            element: *element,
            src: src.to_string(),
            duration,
        });
    }
}
