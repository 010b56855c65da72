//! FIFO bundle queue with an optional capacity limit.
//!
//! Backs both the input buffer of a [`Filter`](crate::filter::Filter)
//! and the storage of a [`Repository`](crate::repository::Repository).
//! Aggregate views (`len`, `entity_count`) are recomputed from the
//! queue contents on every call, never cached.

use std::collections::VecDeque;

use crate::bundle::Bundle;

/// A FIFO queue of bundles, unbounded unless a limit is set.
#[derive(Debug, Clone, Default)]
pub struct BundleQueue {
    queue: VecDeque<Bundle>,
    limit: Option<usize>,
}

impl BundleQueue {
    /// Create an unbounded queue.
    pub fn new() -> Self {
        BundleQueue::default()
    }

    /// Create a queue that holds at most `limit` bundles.
    pub fn with_limit(limit: usize) -> Self {
        BundleQueue {
            queue: VecDeque::new(),
            limit: Some(limit),
        }
    }

    /// The configured capacity limit, or `None` if unbounded.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Change the capacity limit. Bundles already queued beyond a new,
    /// smaller limit stay queued; only further inserts are rejected.
    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    /// Enqueue a bundle at the tail.
    ///
    /// If a limit is configured and the queue is already at capacity,
    /// the bundle is handed back via `Err` and the queue is unchanged.
    pub fn accept(&mut self, bundle: Bundle) -> Result<(), Bundle> {
        if let Some(limit) = self.limit {
            if self.queue.len() >= limit {
                return Err(bundle);
            }
        }
        self.queue.push_back(bundle);
        Ok(())
    }

    /// Remove and return the head bundle, or `None` if empty.
    pub fn take(&mut self) -> Option<Bundle> {
        self.queue.pop_front()
    }

    /// Remove and return up to `n` bundles in FIFO order.
    ///
    /// Stops early when the queue runs dry; it never waits for more
    /// bundles to arrive.
    pub fn take_up_to(&mut self, n: usize) -> Vec<Bundle> {
        let count = n.min(self.queue.len());
        self.queue.drain(..count).collect()
    }

    /// The head bundle, without removing it.
    pub fn peek(&self) -> Option<&Bundle> {
        self.queue.front()
    }

    /// Number of queued bundles.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if no bundles are queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Total entity count across all queued bundles (derived).
    pub fn entity_count(&self) -> usize {
        self.queue.iter().map(Bundle::len).sum()
    }
}
