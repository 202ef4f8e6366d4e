//! Scripted tick sources.
//!
//! [`ScriptedTickSource`] stands in for the simulation: every step advances
//! a shared [`ManualClock`] by a scripted duration and reports a scripted
//! list of phase samples, so latency and profiling results are exact.

use cadence_core::{Phase, Probe, TickSource};

use crate::ManualClock;

/// Deterministic [`TickSource`] driven by a duration script.
///
/// Step durations cycle through the script; an empty script means steps
/// take no time. Phase samples are reported on every step.
#[derive(Clone, Debug)]
pub struct ScriptedTickSource {
    clock: ManualClock,
    durations: Vec<u64>,
    cursor: usize,
    phases: Vec<(Phase<'static>, u64)>,
    steps: u64,
    recorded_steps: u64,
    light_hooks: u64,
    heavy_hooks: u64,
}

impl ScriptedTickSource {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            durations: Vec::new(),
            cursor: 0,
            phases: Vec::new(),
            steps: 0,
            recorded_steps: 0,
            light_hooks: 0,
            heavy_hooks: 0,
        }
    }

    /// Per-step durations in microseconds, used in order and then repeated.
    pub fn with_step_durations(mut self, durations: impl IntoIterator<Item = u64>) -> Self {
        self.durations = durations.into_iter().collect();
        self.cursor = 0;
        self
    }

    /// Phase samples reported on every step.
    pub fn with_phase(mut self, phase: Phase<'static>, duration_us: u64) -> Self {
        self.phases.push((phase, duration_us));
        self
    }

    /// Real steps run.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Steps that ran with a recording probe.
    pub fn recorded_steps(&self) -> u64 {
        self.recorded_steps
    }

    pub fn light_hooks(&self) -> u64 {
        self.light_hooks
    }

    pub fn heavy_hooks(&self) -> u64 {
        self.heavy_hooks
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    fn next_duration(&mut self) -> u64 {
        if self.durations.is_empty() {
            return 0;
        }
        let d = self.durations[self.cursor % self.durations.len()];
        self.cursor += 1;
        d
    }
}

impl TickSource for ScriptedTickSource {
    fn run_one_step(&mut self, probe: &mut Probe<'_>) {
        self.steps += 1;
        if probe.is_recording() {
            self.recorded_steps += 1;
        }
        for &(phase, us) in &self.phases {
            probe.record(phase, us);
        }
        let d = self.next_duration();
        self.clock.advance(d);
    }

    fn light_post_step(&mut self) {
        self.light_hooks += 1;
    }

    fn heavy_post_step(&mut self) {
        self.heavy_hooks += 1;
    }
}
