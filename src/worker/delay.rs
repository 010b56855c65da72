//! DelayWorker — holds a bundle for a duration, then forwards it
//! unchanged.

use std::any::Any;

use crate::buffer::BundleQueue;
use crate::bundle::Bundle;
use crate::error::FlowResult;
use crate::tick::Tick;

use super::{DurationSource, Worker, WorkerState};

/// A worker that processes a bundle by delaying it; the content is
/// kept untouched.
///
/// The duration is either fixed or read from a header of each pulled
/// bundle, and is counted either per bundle or per entity (multiplied
/// by the bundle's entity count). The tick that pulls the bundle
/// already counts toward the duration, so a total duration of D
/// means the bundle is forwarded exactly D ticks after the pull tick,
/// inclusive — a duration of 1 completes on the pull tick itself.
///
/// Durations are resolved against the buffer head *before* it is
/// pulled: if the duration header is missing or malformed, the error
/// propagates and the bundle stays in the buffer, retryable.
pub struct DelayWorker {
    id: String,
    state: WorkerState,
    duration: DurationSource,
    per_entity: bool,
    current: Option<Bundle>,
    countdown: u64,
}

impl DelayWorker {
    /// Create a delay worker with the given id and a per-bundle
    /// duration of zero (forwards on the pull tick until configured).
    pub fn new(id: impl Into<String>) -> Self {
        DelayWorker {
            id: id.into(),
            state: WorkerState::Idle,
            duration: DurationSource::Fixed(0),
            per_entity: false,
            current: None,
            countdown: 0,
        }
    }

    /// Set the duration source and whether it counts per entity
    /// (multiplied by the pulled bundle's entity count) or per bundle.
    pub fn set_duration(&mut self, duration: DurationSource, per_entity: bool) {
        self.duration = duration;
        self.per_entity = per_entity;
    }

    /// The configured duration source.
    pub fn duration(&self) -> &DurationSource {
        &self.duration
    }

    /// Returns `true` if the duration is counted per entity.
    pub fn is_per_entity(&self) -> bool {
        self.per_entity
    }

    /// Ticks left on the in-flight bundle.
    pub fn remaining(&self) -> u64 {
        self.countdown
    }

    /// Burn one tick of the countdown; on reaching zero, go idle and
    /// hand the bundle back for forwarding.
    fn tick_busy(&mut self) -> Option<Bundle> {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.state = WorkerState::Idle;
            self.current.take()
        } else {
            None
        }
    }
}

impl Worker for DelayWorker {
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
                // Leftover in-flight work from a pause/resume cycle is
                // picked up before any new pull.
                if self.countdown > 0 || self.current.is_some() {
                    self.state = WorkerState::Busy;
                    return Ok(self.tick_busy());
                }

                // Resolve the duration against the head before
                // pulling, so a bad header leaves the buffer intact.
                let total = match buffer.peek() {
                    Some(head) => {
                        let base = self.duration.resolve(head)?;
                        if self.per_entity {
                            base.saturating_mul(head.len() as u64)
                        } else {
                            base
                        }
                    }
                    None => return Ok(None),
                };
                let Some(bundle) = buffer.take() else {
                    return Ok(None);
                };

                log::trace!(
                    "delay worker {} pulled {} at {} for {} ticks",
                    self.id,
                    bundle,
                    tick,
                    total
                );
                self.current = Some(bundle);
                self.countdown = total;
                self.state = WorkerState::Busy;
                // The pull tick counts toward the duration.
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
