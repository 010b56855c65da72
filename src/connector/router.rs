//! Router — forwards each bundle to one of several destinations based
//! on the value of a routing header.

use std::collections::BTreeMap;

use crate::bundle::Bundle;
use crate::network::UnitId;

/// A connector that routes each incoming bundle to one of its named
/// routes, keyed by the value of a configurable header.
///
/// If the routing header is unset on the bundle, or its value matches
/// no registered route, the bundle goes to the default route. The
/// default route *is* the router's successor slot — setting one sets
/// the other, they are the same underlying field. A bundle that falls
/// through with no default configured is dropped.
///
/// The router never mutates a bundle's entities or headers.
#[derive(Debug, Clone, Default)]
pub struct Router {
    header_name: String,
    routes: BTreeMap<String, UnitId>,
    default_route: Option<UnitId>,
}

impl Router {
    /// Create a router that reads the named header for its decisions.
    pub fn new(header_name: impl Into<String>) -> Self {
        Router {
            header_name: header_name.into(),
            routes: BTreeMap::new(),
            default_route: None,
        }
    }

    /// The name of the header consulted for routing decisions.
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Change the header consulted for routing decisions.
    pub fn set_header_name(&mut self, name: impl Into<String>) {
        self.header_name = name.into();
    }

    /// Register a route. An existing route with the same name is
    /// replaced.
    pub fn add_route(&mut self, name: impl Into<String>, destination: UnitId) {
        self.routes.insert(name.into(), destination);
    }

    /// Remove a route if it exists; removing an absent route is a
    /// no-op.
    pub fn remove_route(&mut self, name: &str) {
        self.routes.remove(name);
    }

    /// Returns `true` if a route with the given name is registered.
    pub fn has_route(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    /// The destination of the named route, if registered.
    pub fn route(&self, name: &str) -> Option<UnitId> {
        self.routes.get(name).copied()
    }

    /// Number of registered routes (excluding the default).
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// The default route (alias of the successor slot).
    pub fn default_route(&self) -> Option<UnitId> {
        self.default_route
    }

    /// Set or clear the default route (alias of the successor slot).
    pub fn set_default_route(&mut self, destination: Option<UnitId>) {
        self.default_route = destination;
    }

    /// The successor slot — same field as the default route.
    pub fn successor(&self) -> Option<UnitId> {
        self.default_route
    }

    /// Set the successor slot — same field as the default route.
    pub fn set_successor(&mut self, destination: Option<UnitId>) {
        self.default_route = destination;
    }

    /// Decide where the bundle should go: the matching route, else the
    /// default, else nowhere (`None` means the bundle is dropped).
    pub fn select(&self, bundle: &Bundle) -> Option<UnitId> {
        match bundle.try_header(&self.header_name) {
            Some(value) => self.routes.get(value).copied().or(self.default_route),
            None => self.default_route,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;

    fn tagged(value: &str) -> Bundle {
        let mut b = Bundle::new();
        b.push(Entity::new("e"));
        b.set_header("route", value);
        b
    }

    #[test]
    fn test_matching_route_wins() {
        let mut r = Router::new("route");
        r.add_route("A", UnitId::new(1));
        r.add_route("B", UnitId::new(2));
        r.set_default_route(Some(UnitId::new(9)));

        assert_eq!(r.select(&tagged("A")), Some(UnitId::new(1)));
        assert_eq!(r.select(&tagged("B")), Some(UnitId::new(2)));
    }

    #[test]
    fn test_unmatched_value_falls_to_default() {
        let mut r = Router::new("route");
        r.add_route("A", UnitId::new(1));
        r.set_default_route(Some(UnitId::new(9)));

        assert_eq!(r.select(&tagged("D")), Some(UnitId::new(9)));
    }

    #[test]
    fn test_missing_header_falls_to_default() {
        let mut r = Router::new("route");
        r.add_route("A", UnitId::new(1));
        r.set_default_route(Some(UnitId::new(9)));

        let mut plain = Bundle::new();
        plain.push(Entity::new("e"));
        assert_eq!(r.select(&plain), Some(UnitId::new(9)));
    }

    #[test]
    fn test_no_default_means_drop() {
        let mut r = Router::new("route");
        r.add_route("A", UnitId::new(1));
        assert_eq!(r.select(&tagged("D")), None);
    }

    #[test]
    fn test_add_route_replaces() {
        let mut r = Router::new("route");
        r.add_route("A", UnitId::new(1));
        r.add_route("A", UnitId::new(2));
        assert_eq!(r.route_count(), 1);
        assert_eq!(r.select(&tagged("A")), Some(UnitId::new(2)));
    }

    #[test]
    fn test_remove_route_is_idempotent() {
        let mut r = Router::new("route");
        r.add_route("A", UnitId::new(1));
        r.remove_route("A");
        r.remove_route("A");
        assert!(!r.has_route("A"));
    }

    #[test]
    fn test_successor_aliases_default_route() {
        let mut r = Router::new("route");
        r.set_successor(Some(UnitId::new(7)));
        assert_eq!(r.default_route(), Some(UnitId::new(7)));

        r.set_default_route(Some(UnitId::new(8)));
        assert_eq!(r.successor(), Some(UnitId::new(8)));
    }
}
