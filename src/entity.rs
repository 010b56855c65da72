//! Entity — the atomic, identity-bearing item flowing through the network.

/// A single simulated item.
///
/// Identity is the `id` string; equality and lookups are id-based.
/// An `Entity` is immutable once created and is owned by exactly one
/// [`Bundle`](crate::bundle::Bundle) at a time — the kernel always
/// *moves* entities between bundles, it never duplicates them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    id: String,
}

impl Entity {
    /// Create an entity with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Entity { id: id.into() }
    }

    /// The entity's identifier.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E[{}]", self.id)
    }
}
