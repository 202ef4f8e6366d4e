//! Capability traits supplied by the host.
//!
//! The engine never reaches into the simulation directly. It runs steps
//! through a [`TickSource`], reads time from a [`Clock`], sends notices and
//! reports through a [`Broadcaster`], and routes phase timings into a
//! [`PhaseSink`]. Swapping these out is how tests get deterministic,
//! instant-return stand-ins for a real world.

use std::time::Instant;

use crate::probe::{Phase, Probe};
use crate::text::StyledText;

/// The opaque unit of simulation the controller paces.
///
/// The controller may call [`run_one_step`](TickSource::run_one_step) zero
/// or more times per external invocation. After every executed step it
/// calls [`light_post_step`](TickSource::light_post_step); once per
/// invocation that ran at least one step it calls
/// [`heavy_post_step`](TickSource::heavy_post_step).
pub trait TickSource {
    /// Advance the simulation by one tick.
    ///
    /// Instrumented phases report their durations through `probe`. When no
    /// profiling session is active the probe is disabled and costs a branch.
    fn run_one_step(&mut self, probe: &mut Probe<'_>);

    /// Cheap per-step follow-up work (e.g. per-tick counters).
    fn light_post_step(&mut self) {}

    /// Expensive per-invocation follow-up work (e.g. HUD refresh).
    fn heavy_post_step(&mut self) {}
}

impl<T: TickSource + ?Sized> TickSource for Box<T> {
    fn run_one_step(&mut self, probe: &mut Probe<'_>) {
        (**self).run_one_step(probe)
    }

    fn light_post_step(&mut self) {
        (**self).light_post_step()
    }

    fn heavy_post_step(&mut self) {
        (**self).heavy_post_step()
    }
}

/// Who a broadcast is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Audience {
    /// Every participant.
    All,
    /// Only participants with operator permissions.
    Operators,
}

/// Fire-and-forget delivery of text to participants.
pub trait Broadcaster {
    /// Deliver `message` to `audience`. Must not fail or block the caller.
    fn broadcast(&mut self, message: &StyledText, audience: Audience);
}

impl<B: Broadcaster + ?Sized> Broadcaster for Box<B> {
    fn broadcast(&mut self, message: &StyledText, audience: Audience) {
        (**self).broadcast(message, audience)
    }
}

/// Monotonic microsecond time source.
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin.
    fn now_us(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

/// Wall-clock [`Clock`] backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// A clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

/// Receiver of instrumented phase durations.
///
/// Implemented by the profiling session; the [`Probe`] forwards to it only
/// while a session is active.
pub trait PhaseSink {
    /// Accumulate one phase duration, in microseconds.
    fn record(&mut self, phase: Phase<'_>, duration_us: u64);
}
