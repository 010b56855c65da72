//! Splitter — fan-out connector that re-distributes one bundle's
//! entities across several smaller bundles.

use crate::bundle::Bundle;
use crate::network::UnitId;

/// A connector that splits an incoming bundle into chunks of a
/// preferred size.
///
/// Entities are taken in order and grouped into fresh, header-less
/// bundles of `chunk_size` entities each, forwarded as they fill. The
/// final chunk may be smaller; it is forwarded only when it holds
/// **more than one** entity — a left-over chunk of exactly one entity
/// is dropped. That threshold is a deliberate compatibility quirk;
/// changing it silently would break existing topologies.
#[derive(Debug, Clone)]
pub struct Splitter {
    chunk_size: usize,
    successor: Option<UnitId>,
}

impl Splitter {
    /// Create a splitter with the given preferred chunk size.
    ///
    /// # Panics
    /// Panics if `chunk_size` is zero.
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size >= 1, "chunk size must be at least 1");
        Splitter {
            chunk_size,
            successor: None,
        }
    }

    /// The preferred entity count per emitted bundle.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Change the preferred chunk size.
    ///
    /// # Panics
    /// Panics if `chunk_size` is zero.
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        assert!(chunk_size >= 1, "chunk size must be at least 1");
        self.chunk_size = chunk_size;
    }

    /// The successor slot.
    pub fn successor(&self) -> Option<UnitId> {
        self.successor
    }

    /// Set or clear the successor slot.
    pub fn set_successor(&mut self, destination: Option<UnitId>) {
        self.successor = destination;
    }

    /// Split the bundle into the chunks to forward, in emission order.
    /// The incoming bundle's headers do not survive the split.
    pub fn split(&self, bundle: Bundle) -> Vec<Bundle> {
        let mut chunks = Vec::new();
        let mut chunk = Bundle::new();

        for entity in bundle.into_entities() {
            chunk.push(entity);
            if chunk.len() == self.chunk_size {
                chunks.push(std::mem::take(&mut chunk));
            }
        }

        // A partial remainder only survives when it holds more than
        // one entity.
        if chunk.len() > 1 {
            chunks.push(chunk);
        } else if chunk.len() == 1 {
            log::warn!("splitter dropped a single-entity remainder");
        }
        chunks
    }
}
