//! Load queue.
//!
//! Items are inserted in batches. Each batch goes in front of everything
//! still waiting, so the most recently revealed images are serviced first,
//! while items within one batch keep their encounter order:
//!
//! ```
//! use lazyload::queue::{LoadQueue, QueueItem};
//!
//! let mut queue = LoadQueue::new();
//! queue.enqueue_batch(vec![QueueItem::new("a1", "a1.png"), QueueItem::new("a2", "a2.png")]);
//! queue.enqueue_batch(vec![QueueItem::new("b1", "b1.png"), QueueItem::new("b2", "b2.png")]);
//!
//! let order: Vec<_> = std::iter::from_fn(|| queue.dequeue_one()).map(|i| i.element).collect();
//! assert_eq!(order, vec!["b1", "b2", "a1", "a2"]);
//! ```
//!
//! There is no deduplication: an item enqueued twice is served twice.

use std::collections::VecDeque;

/// An element paired with the URL to fetch for it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueItem<E> {
    pub element: E,
    pub src: String,
}

impl<E> QueueItem<E> {
    /// Creates a new queue item.
    pub fn new(element: E, src: impl Into<String>) -> Self {
        Self {
            element,
            src: src.into(),
        }
    }
}

/// Pending load requests, front first.
///
/// Not thread-safe; the loader keeps it behind its own lock.
#[derive(Debug)]
pub struct LoadQueue<E> {
    items: VecDeque<QueueItem<E>>,
}

impl<E> LoadQueue<E> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Inserts `batch` ahead of all queued items, keeping its internal order.
    pub fn enqueue_batch(&mut self, batch: Vec<QueueItem<E>>) {
        for item in batch.into_iter().rev() {
            self.items.push_front(item);
        }
    }

    /// Removes and returns the front item.
    pub fn dequeue_one(&mut self) -> Option<QueueItem<E>> {
        self.items.pop_front()
    }

    /// Returns the number of queued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops every queued item, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        removed
    }
}

impl<E> Default for LoadQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}
