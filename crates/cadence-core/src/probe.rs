//! Instrumentation handle passed into each simulation step.
//!
//! A [`Probe`] is built by the engine for every real step. When a profiling
//! session is active it carries a `&mut dyn PhaseSink`; otherwise it carries
//! nothing and [`Probe::time`] runs the closure without touching the clock.

use crate::id::{ChunkPos, Dimension};
use crate::traits::{Clock, PhaseSink};

/// A timed phase of the simulation step.
///
/// The shape mirrors the step's call tree:
///
/// ```text
/// step
///  - redstone: signal, pending add, pending update, pending remove
///  - dimension (chunk (un)load, village)
///  - entity systems
///  - chunk tick (per chunk)
///     - block entities
///     - random tick
///     - pending ticks
///     - actor tick (per actor)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase<'a> {
    /// Redstone signal propagation.
    RedstoneSignal,
    /// Redstone component insertion queue.
    RedstonePendingAdd,
    /// Redstone component update queue.
    RedstonePendingUpdate,
    /// Redstone component removal.
    RedstonePendingRemove,
    /// Dimension housekeeping (chunk loading, villages).
    Dimension,
    /// The entity-component systems pass.
    EntitySystems,
    /// One chunk's whole tick.
    ChunkTick {
        /// Region the chunk belongs to.
        dimension: Dimension,
        /// Chunk coordinate.
        pos: ChunkPos,
    },
    /// Block-entity updates inside a chunk tick.
    BlockEntities,
    /// Random block ticks inside a chunk tick.
    RandomTick,
    /// Scheduled block ticks inside a chunk tick.
    PendingTicks,
    /// One actor's tick.
    Actor {
        /// Region the actor is in.
        dimension: Dimension,
        /// Actor type name, e.g. `"minecraft:zombie"`.
        type_name: &'a str,
    },
}

/// Per-step instrumentation handle.
pub struct Probe<'a> {
    sink: Option<&'a mut dyn PhaseSink>,
    clock: &'a dyn Clock,
}

impl<'a> Probe<'a> {
    /// A probe that forwards to `sink` when it is `Some`.
    pub fn new(sink: Option<&'a mut dyn PhaseSink>, clock: &'a dyn Clock) -> Self {
        Self { sink, clock }
    }

    /// A probe that records nothing.
    pub fn disabled(clock: &'a dyn Clock) -> Self {
        Self { sink: None, clock }
    }

    /// Whether a profiling session is listening.
    ///
    /// Sources can use this to skip building expensive phase keys.
    #[inline]
    pub fn is_recording(&self) -> bool {
        self.sink.is_some()
    }

    /// Report a phase duration measured by the caller.
    #[inline]
    pub fn record(&mut self, phase: Phase<'_>, duration_us: u64) {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.record(phase, duration_us);
        }
    }

    /// Run `f`, timing it as `phase` when recording.
    #[inline]
    pub fn time<R>(&mut self, phase: Phase<'_>, f: impl FnOnce() -> R) -> R {
        match self.sink.as_deref_mut() {
            None => f(),
            Some(sink) => {
                let start = self.clock.now_us();
                let out = f();
                sink.record(phase, self.clock.now_us().saturating_sub(start));
                out
            }
        }
    }

    /// Open a phase that encloses other timed phases.
    ///
    /// Returns the start time when recording, `None` otherwise; pass it to
    /// [`end`](Self::end) with the phase once the enclosed work is done.
    #[inline]
    pub fn begin(&self) -> Option<u64> {
        self.sink.as_ref().map(|_| self.clock.now_us())
    }

    /// Close a phase opened with [`begin`](Self::begin).
    #[inline]
    pub fn end(&mut self, phase: Phase<'_>, started: Option<u64>) {
        if let (Some(start), Some(sink)) = (started, self.sink.as_deref_mut()) {
            sink.record(phase, self.clock.now_us().saturating_sub(start));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct StepClock(Cell<u64>);

    impl Clock for StepClock {
        fn now_us(&self) -> u64 {
            let t = self.0.get();
            self.0.set(t + 7);
            t
        }
    }

    #[derive(Default)]
    struct Collect(Vec<(String, u64)>);

    impl PhaseSink for Collect {
        fn record(&mut self, phase: Phase<'_>, duration_us: u64) {
            self.0.push((format!("{phase:?}"), duration_us));
        }
    }

    #[test]
    fn disabled_probe_never_reads_clock() {
        let clock = StepClock(Cell::new(0));
        let mut probe = Probe::disabled(&clock);
        assert!(!probe.is_recording());
        let v = probe.time(Phase::Dimension, || 5);
        probe.record(Phase::EntitySystems, 10);
        assert_eq!(v, 5);
        assert_eq!(clock.0.get(), 0);
    }

    #[test]
    fn enabled_probe_times_closure() {
        let clock = StepClock(Cell::new(100));
        let mut sink = Collect::default();
        {
            let mut probe = Probe::new(Some(&mut sink), &clock);
            assert!(probe.is_recording());
            probe.time(Phase::RandomTick, || ());
            probe.record(
                Phase::Actor {
                    dimension: Dimension::Nether,
                    type_name: "ghast",
                },
                42,
            );
        }
        assert_eq!(sink.0.len(), 2);
        assert_eq!(sink.0[0], ("RandomTick".to_string(), 7));
        assert_eq!(sink.0[1].1, 42);
    }

    #[test]
    fn spans_enclose_nested_phases() {
        let clock = StepClock(Cell::new(0));
        let mut sink = Collect::default();
        {
            let mut probe = Probe::new(Some(&mut sink), &clock);
            let chunk = probe.begin();
            probe.time(Phase::BlockEntities, || ());
            probe.end(Phase::Dimension, chunk);
        }
        // begin=0, inner 7..14, end reads 21
        assert_eq!(sink.0[0], ("BlockEntities".to_string(), 7));
        assert_eq!(sink.0[1], ("Dimension".to_string(), 21));
    }

    #[test]
    fn disabled_span_is_free() {
        let clock = StepClock(Cell::new(0));
        let mut probe = Probe::disabled(&clock);
        let span = probe.begin();
        probe.end(Phase::Dimension, span);
        assert_eq!(span, None);
        assert_eq!(clock.0.get(), 0);
    }
}
