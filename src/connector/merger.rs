//! Merger — fan-in connector that combines N incoming bundles into one.

use std::collections::VecDeque;

use crate::bundle::Bundle;
use crate::network::UnitId;

/// A connector that parks incoming bundles until `size` of them have
/// arrived, then concatenates their entities (in arrival order) into
/// one fresh bundle and forwards it.
///
/// The merge count is measured in *bundles*, not entities. Headers of
/// the original bundles are discarded — they described their own hop,
/// not the merged payload.
///
/// At most one merge happens per arrival: if a backlog somehow holds
/// more than one complete group (say, after shrinking `size`), only
/// the first group is emitted by the triggering call; the rest waits
/// for further arrivals.
#[derive(Debug, Clone)]
pub struct Merger {
    size: usize,
    pending: VecDeque<Bundle>,
    successor: Option<UnitId>,
}

impl Merger {
    /// Create a merger that combines `size` bundles per merge.
    ///
    /// # Panics
    /// Panics if `size` is zero.
    pub fn new(size: usize) -> Self {
        assert!(size >= 1, "merge size must be at least 1");
        Merger {
            size,
            pending: VecDeque::new(),
            successor: None,
        }
    }

    /// Number of bundles combined per merge.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Change the merge size. Takes effect on the next arrival.
    ///
    /// # Panics
    /// Panics if `size` is zero.
    pub fn set_size(&mut self, size: usize) {
        assert!(size >= 1, "merge size must be at least 1");
        self.size = size;
    }

    /// Number of bundles currently waiting for a complete group.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The successor slot.
    pub fn successor(&self) -> Option<UnitId> {
        self.successor
    }

    /// Set or clear the successor slot.
    pub fn set_successor(&mut self, destination: Option<UnitId>) {
        self.successor = destination;
    }

    /// Park the bundle; if the pending queue now holds a complete
    /// group, dequeue exactly `size` bundles and return their merged
    /// result for forwarding.
    pub fn accept(&mut self, bundle: Bundle) -> Option<Bundle> {
        self.pending.push_back(bundle);
        if self.pending.len() < self.size {
            return None;
        }

        let mut merged = Bundle::new();
        for _ in 0..self.size {
            let next = self.pending.pop_front()?;
            for entity in next.into_entities() {
                merged.push(entity);
            }
        }
        log::debug!(
            "merged {} bundles into one with {} entities",
            self.size,
            merged.len()
        );
        Some(merged)
    }
}
