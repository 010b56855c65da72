//! Filter — the buffered, tick-driven processing node.
//!
//! Unlike connectors, a filter never forwards on arrival: incoming
//! bundles are parked in a FIFO input buffer and leave only when one
//! of the filter's workers finishes processing them, possibly many
//! ticks later.

use crate::buffer::BundleQueue;
use crate::bundle::Bundle;
use crate::error::FlowResult;
use crate::network::UnitId;
use crate::tick::Tick;
use crate::worker::Worker;

/// A buffered unit hosting zero or more workers.
///
/// The buffer is unbounded unless a limit is configured; a full,
/// limited buffer rejects inserts observably (the network wraps the
/// rejection into [`FlowError::BufferOverflow`]). Workers are advanced
/// once per tick, in registration order, with no extra scheduling
/// policy — they are otherwise independent and do not coordinate.
///
/// [`FlowError::BufferOverflow`]: crate::error::FlowError::BufferOverflow
#[derive(Default)]
pub struct Filter {
    buffer: BundleQueue,
    workers: Vec<Box<dyn Worker>>,
    successor: Option<UnitId>,
}

impl Filter {
    /// Create a filter with an unbounded input buffer and no workers.
    pub fn new() -> Self {
        Filter::default()
    }

    /// Create a filter whose input buffer holds at most `limit`
    /// bundles.
    pub fn with_buffer_limit(limit: usize) -> Self {
        Filter {
            buffer: BundleQueue::with_limit(limit),
            workers: Vec::new(),
            successor: None,
        }
    }

    // ── Input buffer ──────────────────────────────────────────────

    /// The configured buffer limit, or `None` if unbounded.
    pub fn buffer_limit(&self) -> Option<usize> {
        self.buffer.limit()
    }

    /// Change the buffer limit.
    pub fn set_buffer_limit(&mut self, limit: Option<usize>) {
        self.buffer.set_limit(limit);
    }

    /// Enqueue a bundle, or hand it back if the buffer is full.
    pub(crate) fn enqueue(&mut self, bundle: Bundle) -> Result<(), Bundle> {
        self.buffer.accept(bundle)
    }

    /// Number of bundles waiting in the input buffer (derived).
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Total entities waiting in the input buffer (derived).
    pub fn buffer_entity_count(&self) -> usize {
        self.buffer.entity_count()
    }

    /// Remove and return the head bundle, or `None` if the buffer is
    /// empty.
    pub fn take(&mut self) -> Option<Bundle> {
        self.buffer.take()
    }

    /// Remove and return up to `n` bundles in FIFO order; fewer if the
    /// buffer runs dry first.
    pub fn take_up_to(&mut self, n: usize) -> Vec<Bundle> {
        self.buffer.take_up_to(n)
    }

    // ── Worker registry ───────────────────────────────────────────

    /// Register a worker. The worker is bound to this filter as its
    /// host for the rest of its life; registration order is update
    /// order. Id uniqueness is a caller convention — lookups return
    /// the first match.
    pub fn add_worker(&mut self, worker: Box<dyn Worker>) {
        self.workers.push(worker);
    }

    /// Number of registered workers.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// The worker at `index`, if any.
    pub fn worker(&self, index: usize) -> Option<&dyn Worker> {
        self.workers.get(index).map(Box::as_ref)
    }

    /// Mutable access to the worker at `index`, if any.
    pub fn worker_mut(&mut self, index: usize) -> Option<&mut (dyn Worker + 'static)> {
        self.workers.get_mut(index).map(Box::as_mut)
    }

    /// The first worker with the given id, if any (linear scan).
    pub fn worker_by_id(&self, id: &str) -> Option<&dyn Worker> {
        self.workers.iter().find(|w| w.id() == id).map(Box::as_ref)
    }

    /// Mutable access to the first worker with the given id, if any.
    pub fn worker_by_id_mut(&mut self, id: &str) -> Option<&mut (dyn Worker + 'static)> {
        self.workers
            .iter_mut()
            .find(|w| w.id() == id)
            .map(Box::as_mut)
    }

    /// Returns `true` if a worker with the given id is registered.
    pub fn has_worker(&self, id: &str) -> bool {
        self.worker_by_id(id).is_some()
    }

    /// Remove and return the worker at `index`; later workers keep
    /// their relative update order.
    ///
    /// # Panics
    /// Panics if `index` is out of range (programmer error).
    pub fn remove_worker_at(&mut self, index: usize) -> Box<dyn Worker> {
        self.workers.remove(index)
    }

    /// Remove and return the first worker with the given id, if any.
    pub fn remove_worker_by_id(&mut self, id: &str) -> Option<Box<dyn Worker>> {
        let index = self.workers.iter().position(|w| w.id() == id)?;
        Some(self.workers.remove(index))
    }

    // ── Aggregates & ticking ──────────────────────────────────────

    /// Bundles currently being processed, summed over all workers.
    pub fn in_flight_bundles(&self) -> usize {
        self.workers.iter().map(|w| w.bundle_count()).sum()
    }

    /// Entities currently being processed, summed over all workers.
    pub fn in_flight_entities(&self) -> usize {
        self.workers.iter().map(|w| w.entity_count()).sum()
    }

    /// The successor slot.
    pub fn successor(&self) -> Option<UnitId> {
        self.successor
    }

    /// Set or clear the successor slot.
    pub fn set_successor(&mut self, destination: Option<UnitId>) {
        self.successor = destination;
    }

    /// Advance the worker at `index` by one tick against this filter's
    /// own buffer. Returns the bundle the worker completed, if any.
    ///
    /// # Panics
    /// Panics if `index` is out of range (the network iterates
    /// `0..worker_count()`).
    pub(crate) fn advance_worker(&mut self, index: usize, tick: Tick) -> FlowResult<Option<Bundle>> {
        let Filter {
            buffer, workers, ..
        } = self;
        workers[index].update(tick, buffer)
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("buffer_len", &self.buffer.len())
            .field("buffer_limit", &self.buffer.limit())
            .field("worker_count", &self.workers.len())
            .field("successor", &self.successor)
            .finish()
    }
}
