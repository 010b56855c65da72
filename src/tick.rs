//! Logical time for the tick-driven kernel.
//!
//! Represents a discrete simulation step with no dependency on
//! `std::time`. Ticks only advance when the external driver calls
//! `FlowNetwork::update` — never from wall-clock observation. The
//! kernel does not enforce monotonicity; feeding ticks in order is
//! the driver's contract.

/// One discrete simulated time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(u64);

impl Tick {
    /// The zero-point of simulated time.
    pub const ZERO: Tick = Tick(0);

    /// Create a `Tick` from a raw step counter.
    #[inline]
    pub fn new(value: u64) -> Self {
        Tick(value)
    }

    /// Return the raw step counter.
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }

    /// The tick immediately after `self`.
    /// Returns `None` on overflow (should never happen in practice).
    #[inline]
    pub fn next(self) -> Option<Tick> {
        self.0.checked_add(1).map(Tick)
    }

    /// The tick `delta` steps after `self`.
    #[inline]
    pub fn plus(self, delta: u64) -> Option<Tick> {
        self.0.checked_add(delta).map(Tick)
    }

    /// Returns `true` if `self` is strictly before `other`.
    #[inline]
    pub fn is_before(self, other: Tick) -> bool {
        self.0 < other.0
    }
}

impl std::fmt::Display for Tick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T={}", self.0)
    }
}
