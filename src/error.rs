//! Structured error types for the flow kernel.
//!
//! All fallible public APIs return `Result<T, FlowError>`. The kernel
//! never catches its own errors — every condition propagates to the
//! external driver, which owns all recovery policy (retry admission,
//! reroute on overflow, fallback on a missing header). Invalid
//! positional access into a bundle or a worker registry is a
//! programmer error and panics instead of returning a variant.

use thiserror::Error;

use crate::bundle::Bundle;
use crate::network::UnitId;

/// The top-level error type for the flow-network kernel.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A header was read that is not set on the bundle.
    #[error("header {name:?} is not set on the bundle")]
    HeaderNotFound { name: String },

    /// A duration-bearing header was present but did not parse as an
    /// unsigned integer tick count.
    #[error("duration header {name:?} holds {value:?}, which is not a tick count")]
    InvalidDurationHeader { name: String, value: String },

    /// A capacity-limited filter rejected a bundle because its input
    /// buffer is already full. The rejected bundle rides inside the
    /// error so the caller can retry, reroute, or drop it — the kernel
    /// itself never silently discards it.
    #[error("input buffer of {unit} is full; rejected a bundle of {} entities", bundle.len())]
    BufferOverflow { unit: UnitId, bundle: Bundle },

    /// A unit handle does not refer to any unit in the network.
    #[error("{0} is not a unit in this network")]
    UnknownUnit(UnitId),

    /// `update` was called on a unit that is not a filter.
    #[error("{0} is not a filter and cannot be ticked")]
    NotAFilter(UnitId),

    /// `connect` was called on a terminal unit with no successor slot.
    #[error("{0} is terminal and has no successor slot")]
    NoSuccessorSlot(UnitId),
}

impl FlowError {
    /// Recover the rejected bundle from a [`FlowError::BufferOverflow`].
    ///
    /// Returns the error unchanged for every other variant, so callers
    /// can retry overflows without losing the payload.
    pub fn into_rejected_bundle(self) -> Result<Bundle, FlowError> {
        match self {
            FlowError::BufferOverflow { bundle, .. } => Ok(bundle),
            other => Err(other),
        }
    }
}

/// Convenience alias for `Result<T, FlowError>`.
pub type FlowResult<T> = Result<T, FlowError>;
