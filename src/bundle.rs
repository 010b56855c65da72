//! Bundle — the ordered container of entities moved between units.
//!
//! A bundle carries two things: an ordered sequence of [`Entity`]
//! objects (the simulated payload) and a string-keyed header map
//! (per-hop routing/timing control data). Connectors that restructure
//! payloads — merging, splitting — intentionally discard headers,
//! because headers describe the current hop, not entity-level state.

use std::collections::BTreeMap;

use crate::entity::Entity;
use crate::error::{FlowError, FlowResult};

/// An ordered sequence of entities plus a header map.
///
/// Entity order reflects insertion order and every removal preserves
/// the relative order of the remainder. Duplicate entity ids are not
/// prevented; id-based lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Bundle {
    entities: Vec<Entity>,
    header: BTreeMap<String, String>,
}

impl Bundle {
    /// Create an empty bundle with no headers.
    pub fn new() -> Self {
        Bundle::default()
    }

    // ── Entity management ─────────────────────────────────────────

    /// Number of entities in this bundle.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the bundle holds no entities.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Append an entity at the tail.
    pub fn push(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// The entity at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range (programmer error).
    pub fn entity(&self, index: usize) -> &Entity {
        &self.entities[index]
    }

    /// Remove and return the entity at `index`; later entities keep
    /// their relative order.
    ///
    /// # Panics
    /// Panics if `index` is out of range (programmer error).
    pub fn remove_at(&mut self, index: usize) -> Entity {
        self.entities.remove(index)
    }

    /// The first entity with the given id, if any.
    pub fn entity_by_id(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Remove and return the first entity with the given id, if any.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id() == id)?;
        Some(self.entities.remove(index))
    }

    /// Returns `true` if an entity with the given id exists.
    pub fn has_entity(&self, id: &str) -> bool {
        self.entity_by_id(id).is_some()
    }

    /// The contained entities, in insertion order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Consume the bundle, yielding its entities in order.
    /// The header map is discarded.
    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }

    // ── Header management ─────────────────────────────────────────

    /// Returns `true` if the named header is set.
    pub fn has_header(&self, name: &str) -> bool {
        self.header.contains_key(name)
    }

    /// The value of the named header.
    ///
    /// Reading an absent header is an error, not a silent default —
    /// components reading routing or duration headers must be prepared
    /// for this to propagate if the upstream connector did not set it.
    pub fn header(&self, name: &str) -> FlowResult<&str> {
        self.header
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| FlowError::HeaderNotFound {
                name: name.to_string(),
            })
    }

    /// The value of the named header, or `None` if unset.
    pub fn try_header(&self, name: &str) -> Option<&str> {
        self.header.get(name).map(String::as_str)
    }

    /// Set the named header, overwriting any existing value.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.header.insert(name.into(), value.into());
    }

    /// Remove the named header and return its previous value, if any.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.header.remove(name)
    }

    /// The set header names, in sorted order.
    pub fn header_names(&self) -> impl Iterator<Item = &str> {
        self.header.keys().map(String::as_str)
    }
}

impl std::fmt::Display for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bundle({} entities, {} headers)",
            self.entities.len(),
            self.header.len()
        )
    }
}
