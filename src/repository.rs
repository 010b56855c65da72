//! Repository — terminal FIFO storage with no successor.

use crate::buffer::BundleQueue;
use crate::bundle::Bundle;

/// A sink/source buffer used as a terminal point or an external pickup
/// point.
///
/// Distinct from a [`Filter`](crate::filter::Filter): no ticking, no
/// workers, no successor — pure storage with FIFO withdrawal. Bundles
/// handed to a repository are consumed by the network; whatever the
/// driver does with them afterwards is outside the simulation.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    store: BundleQueue,
}

impl Repository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Repository::default()
    }

    /// Deposit a bundle at the tail.
    pub fn accept(&mut self, bundle: Bundle) {
        if self.store.accept(bundle).is_err() {
            unreachable!("repository storage is unbounded");
        }
    }

    /// Remove and return the oldest bundle, or `None` if empty.
    pub fn take(&mut self) -> Option<Bundle> {
        self.store.take()
    }

    /// Remove and return up to `count` bundles in FIFO order.
    pub fn take_up_to(&mut self, count: usize) -> Vec<Bundle> {
        self.store.take_up_to(count)
    }

    /// Number of stored bundles.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Total entities across all stored bundles (derived).
    pub fn entity_count(&self) -> usize {
        self.store.entity_count()
    }
}
