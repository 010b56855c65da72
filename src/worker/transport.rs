//! TransportWorker — carries a bundle to the successor, then returns
//! empty before picking up the next one.

use std::any::Any;

use crate::buffer::BundleQueue;
use crate::bundle::Bundle;
use crate::error::FlowResult;
use crate::tick::Tick;

use super::{DurationSource, Worker, WorkerState};

/// A worker that models a carrier with a two-leg trip: an "away" leg
/// delivering the bundle and a "way back" leg returning empty.
///
/// The total countdown is away + way-back, with the pull tick already
/// counting toward it. The bundle is forwarded the moment the
/// remaining countdown reaches the way-back duration — that is, when
/// the away leg completes, which for a zero-length away leg is the
/// pull tick itself — and the worker keeps ticking with no bundle in
/// hand until the countdown reaches zero and it goes idle.
///
/// Both durations are independently fixed or header-sourced and are
/// resolved once, against the buffer head before it is pulled; the
/// empty return leg never needs to consult the forwarded bundle.
pub struct TransportWorker {
    id: String,
    state: WorkerState,
    away: DurationSource,
    way_back: DurationSource,
    current: Option<Bundle>,
    countdown: u64,
    /// Way-back duration of the trip in progress, resolved at pull.
    way_back_ticks: u64,
}

impl TransportWorker {
    /// Create a transport worker with the given id and zero-length
    /// legs (forwards and returns on the pull tick until configured).
    pub fn new(id: impl Into<String>) -> Self {
        TransportWorker {
            id: id.into(),
            state: WorkerState::Idle,
            away: DurationSource::Fixed(0),
            way_back: DurationSource::Fixed(0),
            current: None,
            countdown: 0,
            way_back_ticks: 0,
        }
    }

    /// Set the duration of the away leg (carrying the bundle).
    pub fn set_away(&mut self, duration: DurationSource) {
        self.away = duration;
    }

    /// Set the duration of the way-back leg (returning empty).
    pub fn set_way_back(&mut self, duration: DurationSource) {
        self.way_back = duration;
    }

    /// The configured away-leg duration source.
    pub fn away(&self) -> &DurationSource {
        &self.away
    }

    /// The configured way-back duration source.
    pub fn way_back(&self) -> &DurationSource {
        &self.way_back
    }

    /// Ticks left until the carrier is home again.
    pub fn remaining(&self) -> u64 {
        self.countdown
    }

    /// Burn one tick; drop the bundle off when the away leg completes,
    /// go idle when the whole trip does.
    ///
    /// The threshold check is `<=`, not `==`: a zero-length away leg
    /// starts the countdown already below the way-back mark, so the
    /// bundle is dropped off on the pull tick itself. `take` makes the
    /// hand-off happen at most once per trip.
    fn tick_busy(&mut self) -> Option<Bundle> {
        self.countdown = self.countdown.saturating_sub(1);
        let delivered = if self.countdown <= self.way_back_ticks {
            self.current.take()
        } else {
            None
        };
        if self.countdown == 0 {
            self.state = WorkerState::Idle;
        }
        delivered
    }
}

impl Worker for TransportWorker {
    fn id(&self) -> &str {
        &self.id
    }

    fn state(&self) -> WorkerState {
        self.state
    }

    fn pause(&mut self) {
        self.state = WorkerState::Paused;
    }

    fn resume(&mut self) {
        self.state = WorkerState::Idle;
    }

    fn update(&mut self, tick: Tick, buffer: &mut BundleQueue) -> FlowResult<Option<Bundle>> {
        match self.state {
            WorkerState::Paused | WorkerState::Blocked => Ok(None),
            WorkerState::Busy => Ok(self.tick_busy()),
            WorkerState::Idle => {
                // A paused trip resumes before any new pull — this
                // covers both legs, including the empty way back.
                if self.countdown > 0 || self.current.is_some() {
                    self.state = WorkerState::Busy;
                    return Ok(self.tick_busy());
                }

                let (away, way_back) = match buffer.peek() {
                    Some(head) => (self.away.resolve(head)?, self.way_back.resolve(head)?),
                    None => return Ok(None),
                };
                let Some(bundle) = buffer.take() else {
                    return Ok(None);
                };

                log::trace!(
                    "transport worker {} picked up {} at {} (away {}, back {})",
                    self.id,
                    bundle,
                    tick,
                    away,
                    way_back
                );
                self.current = Some(bundle);
                self.countdown = away.saturating_add(way_back);
                self.way_back_ticks = way_back;
                self.state = WorkerState::Busy;
                // The pull tick counts toward the trip.
                Ok(self.tick_busy())
            }
        }
    }

    fn bundle_count(&self) -> usize {
        usize::from(self.current.is_some())
    }

    fn entity_count(&self) -> usize {
        self.current.as_ref().map_or(0, Bundle::len)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
