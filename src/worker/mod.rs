//! Workers — the stateful executors hosted by a filter.
//!
//! A worker pulls bundles out of its host filter's input buffer and
//! "processes" them over a number of ticks via a four-state machine:
//!
//! ```text
//!            pull (buffer non-empty)
//!   ┌──────┐ ────────────────────────▶ ┌──────┐
//!   │ idle │                           │ busy │──┐ countdown
//!   └──────┘ ◀──────────────────────── └──────┘◀─┘   -1 / tick
//!      ▲        countdown reaches 0
//!      │ resume()                pause()
//!   ┌────────┐ ◀───────────────────── (any state)
//!   │ paused │
//!   └────────┘          ┌─────────┐
//!                       │ blocked │  reserved, never driven
//!                       └─────────┘
//! ```
//!
//! Advancement is strictly sequential: a filter drives its workers one
//! at a time within a single `update` call, so no two workers ever
//! contend for the same buffer.
//!
//! # Module structure
//!
//! | Sub-module | Contents |
//! |---|---|
//! | [`delay`] | [`DelayWorker`] — hold a bundle for a duration |
//! | [`transport`] | [`TransportWorker`] — carry, drop off, return empty |

pub mod delay;
pub mod transport;

pub use delay::DelayWorker;
pub use transport::TransportWorker;

use std::any::Any;

use crate::buffer::BundleQueue;
use crate::bundle::Bundle;
use crate::error::{FlowError, FlowResult};
use crate::tick::Tick;

// ── WorkerState ───────────────────────────────────────────────────────

/// The states of a worker's processing machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum WorkerState {
    /// Ready to pull the next bundle from the host buffer.
    Idle,
    /// Counting down over an in-flight bundle.
    Busy,
    /// Externally suspended; ticks are ignored, in-flight state kept.
    Paused,
    /// Reserved for future worker kinds; no transition logic attached.
    Blocked,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkerState::Idle => "idle",
            WorkerState::Busy => "busy",
            WorkerState::Paused => "paused",
            WorkerState::Blocked => "blocked",
        };
        write!(f, "{}", s)
    }
}

// ── Worker trait ──────────────────────────────────────────────────────

/// Trait implemented by every worker kind.
///
/// A worker lives inside exactly one filter (its host) for its entire
/// life; the host passes its own input buffer to `update` once per
/// tick, and routes whatever bundle the worker completes on to the
/// filter's successor.
///
/// # Contract
/// - `update` is called at most once per tick by the host.
/// - On entering `Idle`, an implementation **must** first check for
///   leftover in-flight work (a held bundle or a nonzero countdown)
///   and fall through to busy logic in the same tick — otherwise a
///   `pause`/`resume` cycle would abandon a half-processed bundle.
/// - `pause` and `resume` overwrite the state unconditionally.
pub trait Worker {
    /// The worker's identifier. Uniqueness among a filter's workers is
    /// a caller convention; lookups return the first match.
    fn id(&self) -> &str;

    /// Current machine state.
    fn state(&self) -> WorkerState;

    /// Force the state to [`WorkerState::Paused`]. In-flight bundle
    /// and countdown are kept.
    fn pause(&mut self);

    /// Force the state back to [`WorkerState::Idle`], regardless of
    /// in-flight state. Leftover work is picked up on the next tick.
    fn resume(&mut self);

    /// Advance the machine by one tick against the host's input
    /// buffer. Returns a bundle when processing completed this tick;
    /// the host forwards it to its successor.
    fn update(&mut self, tick: Tick, buffer: &mut BundleQueue) -> FlowResult<Option<Bundle>>;

    /// Number of bundles currently in flight (0 or 1 for the built-in
    /// kinds).
    fn bundle_count(&self) -> usize;

    /// Number of entities currently in flight.
    fn entity_count(&self) -> usize;

    /// Downcast support for configuration and test inspection.
    fn as_any(&self) -> &dyn Any;
    /// Mutable downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ── DurationSource ────────────────────────────────────────────────────

/// Where a worker's processing duration comes from: a fixed tick
/// count, or a header read off each pulled bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum DurationSource {
    /// The same tick count for every bundle.
    Fixed(u64),
    /// Read the named header of the pulled bundle, parsed as a tick
    /// count. Missing or unparsable headers are errors that surface to
    /// the driver.
    Header(String),
}

impl DurationSource {
    /// Resolve the duration against a bundle.
    pub fn resolve(&self, bundle: &Bundle) -> FlowResult<u64> {
        match self {
            DurationSource::Fixed(ticks) => Ok(*ticks),
            DurationSource::Header(name) => {
                let raw = bundle.header(name)?;
                raw.parse::<u64>()
                    .map_err(|_| FlowError::InvalidDurationHeader {
                        name: name.clone(),
                        value: raw.to_string(),
                    })
            }
        }
    }
}
