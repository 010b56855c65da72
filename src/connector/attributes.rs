//! Attribute setters — connectors that stamp headers onto passing
//! bundles.

use std::any::Any;
use std::collections::BTreeMap;

use crate::bundle::Bundle;

/// A connector that assigns headers to each passing bundle before
/// forwarding it.
///
/// Implementations may compute the headers from the bundle's contents;
/// [`StaticAttributeSetter`] is the fixed-set case. The contract at
/// the boundary is identical either way: set zero or more headers,
/// leave everything else untouched.
pub trait AttributeSetter {
    /// Stamp headers onto the bundle.
    fn apply(&mut self, bundle: &mut Bundle);

    /// Downcast support — required for typed access through the
    /// network's `attributes_as::<T>()`.
    fn as_any(&self) -> &dyn Any;
    /// Mutable downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// An [`AttributeSetter`] that stamps the same fixed set of attributes
/// onto every passing bundle, overwriting same-named headers.
#[derive(Debug, Clone, Default)]
pub struct StaticAttributeSetter {
    attributes: BTreeMap<String, String>,
}

impl StaticAttributeSetter {
    /// Create a setter with no attributes.
    pub fn new() -> Self {
        StaticAttributeSetter::default()
    }

    /// Add an attribute to the set, replacing any existing value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Remove an attribute from the set; absent names are a no-op.
    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    /// Returns `true` if the named attribute is in the set.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Drop every stored attribute.
    pub fn clear_attributes(&mut self) {
        self.attributes.clear();
    }

    /// Number of stored attributes.
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }
}

impl AttributeSetter for StaticAttributeSetter {
    fn apply(&mut self, bundle: &mut Bundle) {
        for (name, value) in &self.attributes {
            bundle.set_header(name.clone(), value.clone());
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
