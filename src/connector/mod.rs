//! Connectors — non-buffering units that transform or redirect a
//! bundle synchronously on arrival.
//!
//! A connector never holds a bundle across ticks: its whole effect
//! happens inside the `inject` call that delivered the bundle, in the
//! same call stack. The [`Merger`] is the one lightly-stateful member
//! of the family (it parks bundles until a group is complete).
//!
//! # Module structure
//!
//! | Sub-module | Contents |
//! |---|---|
//! | [`router`] | [`Router`] — header-keyed route table with a default |
//! | [`merger`] | [`Merger`] — N-bundle fan-in |
//! | [`splitter`] | [`Splitter`] — fixed-chunk fan-out |
//! | [`attributes`] | [`AttributeSetter`] trait + [`StaticAttributeSetter`] |

pub mod attributes;
pub mod merger;
pub mod router;
pub mod splitter;

// Flat re-exports so callers can use `flowsim::connector::Router` etc.
pub use attributes::{AttributeSetter, StaticAttributeSetter};
pub use merger::Merger;
pub use router::Router;
pub use splitter::Splitter;
