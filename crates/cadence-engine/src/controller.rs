//! Tick-rate controller: owns the pacing state and commits transitions.
//!
//! [`TickRateController`] is a thin stateful shell around the pure
//! functions in [`crate::state`]. Every request goes through
//! [`transition`] first and is committed only on success, so a rejected
//! request leaves the controller exactly as it was.

use cadence_core::{ControlError, RestingState, TickStatus};
use tracing::info;

use crate::config::PacingConfig;
use crate::state::{plan_invocation, transition, ControlEvent, Invocation, TickState, Transition};

/// Pacing state machine driven once per external invocation.
#[derive(Clone, Debug)]
pub struct TickRateController {
    state: TickState,
    limits: PacingConfig,
}

impl TickRateController {
    /// A controller in Normal with the given limits.
    pub fn new(limits: PacingConfig) -> Self {
        Self {
            state: TickState::Normal,
            limits,
        }
    }

    /// Apply an operator request.
    ///
    /// On success the new state is already committed; the returned
    /// [`Transition`] carries the reply and any notice to broadcast.
    pub fn apply(&mut self, event: ControlEvent) -> Result<Transition, ControlError> {
        let t = transition(&self.state, event, &self.limits)?;
        info!(from = %self.state.status(), to = %t.state.status(), ?event, "pacing transition");
        self.state = t.state;
        Ok(t)
    }

    /// Pause the simulation.
    pub fn freeze(&mut self) -> Result<Transition, ControlError> {
        self.apply(ControlEvent::Freeze)
    }

    /// Return to Normal, discarding any mode counters. Never rejected.
    pub fn reset(&mut self) -> Result<Transition, ControlError> {
        self.apply(ControlEvent::Reset)
    }

    /// Run `n` ticks inside the next invocation.
    pub fn forward(&mut self, n: i64) -> Result<Transition, ControlError> {
        self.apply(ControlEvent::Forward(n))
    }

    /// Run `n` ticks spread over the following invocations.
    pub fn warp(&mut self, n: i64) -> Result<Transition, ControlError> {
        self.apply(ControlEvent::Warp(n))
    }

    /// Run one tick every `t` invocations.
    pub fn slow_down(&mut self, t: i64) -> Result<Transition, ControlError> {
        self.apply(ControlEvent::SlowDown(t))
    }

    /// Run `t` ticks per invocation.
    pub fn accelerate(&mut self, t: i64) -> Result<Transition, ControlError> {
        self.apply(ControlEvent::Accelerate(t))
    }

    /// Plan and commit the bookkeeping for one external invocation.
    pub fn begin_invocation(&mut self, mean_latency_ms: f64) -> Invocation {
        let (next, inv) = plan_invocation(&self.state, mean_latency_ms, &self.limits);
        self.state = next;
        inv
    }

    /// Current state.
    pub fn state(&self) -> &TickState {
        &self.state
    }

    /// Current status discriminant.
    pub fn status(&self) -> TickStatus {
        self.state.status()
    }

    /// Operator-facing status line.
    pub fn query(&self) -> String {
        self.state.describe()
    }

    /// Configured limits.
    pub fn limits(&self) -> &PacingConfig {
        &self.limits
    }

    /// Ticks left in Forwarding, else 0.
    pub fn forward_remaining(&self) -> u32 {
        match self.state {
            TickState::Forwarding { remaining, .. } => remaining,
            _ => 0,
        }
    }

    /// Ticks left in Warp, else 0.
    pub fn warp_remaining(&self) -> u32 {
        match self.state {
            TickState::Warp { remaining, .. } => remaining,
            _ => 0,
        }
    }

    /// Steps per invocation in Acc, else 1.
    pub fn acc_factor(&self) -> u32 {
        match self.state {
            TickState::Acc { factor } => factor,
            _ => 1,
        }
    }

    /// Invocations per step in SlowDown, else 1.
    pub fn slow_factor(&self) -> u32 {
        match self.state {
            TickState::SlowDown { factor, .. } => factor,
            _ => 1,
        }
    }

    /// Position in the SlowDown cycle, else 0.
    pub fn slow_counter(&self) -> u32 {
        match self.state {
            TickState::SlowDown { counter, .. } => counter,
            _ => 0,
        }
    }

    /// Restore target of a transient state.
    pub fn previous(&self) -> Option<RestingState> {
        match self.state {
            TickState::Forwarding { previous, .. } | TickState::Warp { previous, .. } => {
                Some(previous)
            }
            _ => None,
        }
    }
}

impl Default for TickRateController {
    fn default() -> Self {
        Self::new(PacingConfig::default())
    }
}
