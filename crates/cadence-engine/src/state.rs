//! Tick pacing state machine.
//!
//! Each pacing mode is a [`TickState`] variant carrying only its own
//! counters. All legality rules live in [`transition`], and all
//! per-invocation bookkeeping lives in [`plan_invocation`]. Both are pure:
//! they take a state by reference and return the next one, so every legal
//! and illegal move can be tested without an engine.
//!
//! ```text
//!            freeze                 forward(n) / warp(n)
//!   Normal ─────────▶ Frozen ──────────────────────────▶ Forwarding / Warp
//!     │  ▲               │                                     │
//!     │  └── reset ──────┘◀──── restore previous on completion ┘
//!     │
//!     ├── accelerate(t) ──▶ Acc       (until reset)
//!     └── slow_down(t) ───▶ SlowDown  (until reset)
//! ```

use cadence_core::{ControlError, Operation, RestingState, TickStatus};

use crate::config::PacingConfig;

// ── TickState ────────────────────────────────────────────────────

/// Pacing mode plus the counters that mode needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TickState {
    /// One real step per invocation.
    #[default]
    Normal,
    /// No steps.
    Frozen,
    /// All `remaining` steps in the next invocation, then back to `previous`.
    Forwarding {
        /// Steps left to run.
        remaining: u32,
        /// State to restore on completion.
        previous: RestingState,
    },
    /// Batches of steps per invocation until `remaining` hits zero.
    Warp {
        /// Steps left to run.
        remaining: u32,
        /// State to restore on completion.
        previous: RestingState,
    },
    /// `factor` steps per invocation.
    Acc {
        /// Steps per invocation, in the configured acc range.
        factor: u32,
    },
    /// One step every `factor` invocations.
    SlowDown {
        /// Invocations per step, in the configured slow range.
        factor: u32,
        /// Position in the cycle, in `0..factor`. A step runs at 0.
        counter: u32,
    },
}

impl TickState {
    /// Flat status discriminant.
    pub fn status(&self) -> TickStatus {
        match self {
            Self::Normal => TickStatus::Normal,
            Self::Frozen => TickStatus::Frozen,
            Self::Forwarding { .. } => TickStatus::Forwarding,
            Self::Warp { .. } => TickStatus::Warp,
            Self::Acc { .. } => TickStatus::Acc,
            Self::SlowDown { .. } => TickStatus::SlowDown,
        }
    }

    /// Operator-facing status line.
    pub fn describe(&self) -> String {
        match self {
            Self::Normal => "Normal".to_string(),
            Self::Frozen => "Frozen".to_string(),
            Self::Forwarding { remaining, .. } => format!("Forwarding, {remaining} gt left"),
            Self::Warp { remaining, .. } => format!("Warping, {remaining} gt left"),
            Self::Acc { factor } => format!("{factor} times faster"),
            Self::SlowDown { factor, .. } => format!("{factor} times slower"),
        }
    }
}

impl From<RestingState> for TickState {
    fn from(s: RestingState) -> Self {
        match s {
            RestingState::Normal => Self::Normal,
            RestingState::Frozen => Self::Frozen,
        }
    }
}

// ── Transitions ──────────────────────────────────────────────────

/// An operator request against the state machine.
///
/// Numeric arguments are signed so out-of-range input (including
/// negatives) reaches validation instead of failing to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    /// Pause.
    Freeze,
    /// Return to Normal from anywhere.
    Reset,
    /// Run `n` ticks within the next invocation.
    Forward(i64),
    /// Run `n` ticks spread over invocations.
    Warp(i64),
    /// Run one tick every `t` invocations.
    SlowDown(i64),
    /// Run `t` ticks per invocation.
    Accelerate(i64),
}

/// Effects of an accepted [`ControlEvent`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// State to commit.
    pub state: TickState,
    /// Reply for the operator who issued the request (may be empty).
    pub reply: String,
    /// Announcement for all participants, if any.
    pub notice: Option<String>,
}

impl Transition {
    fn quiet(state: TickState, reply: impl Into<String>) -> Self {
        Self {
            state,
            reply: reply.into(),
            notice: None,
        }
    }
}

fn resting(state: &TickState, operation: Operation) -> Result<RestingState, ControlError> {
    RestingState::from_status(state.status()).ok_or(ControlError::InvalidStateTransition {
        operation,
        status: state.status(),
    })
}

fn require_normal(state: &TickState, operation: Operation) -> Result<(), ControlError> {
    match state {
        TickState::Normal => Ok(()),
        other => Err(ControlError::InvalidStateTransition {
            operation,
            status: other.status(),
        }),
    }
}

fn check_factor(value: i64, range: (u32, u32)) -> Result<u32, ControlError> {
    ControlError::check_range("times", value, i64::from(range.0), i64::from(range.1))?;
    // In range, so it fits.
    Ok(value as u32)
}

fn check_ticks(value: i64) -> Result<u32, ControlError> {
    ControlError::check_range("ticks", value, 1, i64::from(u32::MAX))?;
    Ok(value as u32)
}

/// Decide the outcome of `event` in `state`.
///
/// State legality is checked before argument ranges, so a request that is
/// illegal in the current state is reported as such whatever its argument.
pub fn transition(
    state: &TickState,
    event: ControlEvent,
    limits: &PacingConfig,
) -> Result<Transition, ControlError> {
    match event {
        ControlEvent::Freeze => {
            if let TickState::Frozen = state {
                return Err(ControlError::InvalidStateTransition {
                    operation: Operation::Freeze,
                    status: TickStatus::Frozen,
                });
            }
            Ok(Transition::quiet(TickState::Frozen, "success"))
        }
        ControlEvent::Reset => Ok(Transition::quiet(TickState::Normal, "success")),
        ControlEvent::Forward(n) => {
            let previous = resting(state, Operation::Forward)?;
            let remaining = check_ticks(n)?;
            let next = TickState::Forwarding {
                remaining,
                previous,
            };
            if remaining >= limits.forward_notice_threshold {
                Ok(Transition {
                    state: next,
                    reply: "Forward start".to_string(),
                    notice: Some("The world begins to forward".to_string()),
                })
            } else {
                Ok(Transition::quiet(next, ""))
            }
        }
        ControlEvent::Warp(n) => {
            let previous = resting(state, Operation::Warp)?;
            let remaining = check_ticks(n)?;
            Ok(Transition::quiet(
                TickState::Warp {
                    remaining,
                    previous,
                },
                "Warp start",
            ))
        }
        ControlEvent::SlowDown(t) => {
            require_normal(state, Operation::SlowDown)?;
            let factor = check_factor(t, limits.slow_range)?;
            Ok(Transition {
                state: TickState::SlowDown { factor, counter: 0 },
                reply: String::new(),
                notice: Some(format!("The world will run {factor} times slower")),
            })
        }
        ControlEvent::Accelerate(t) => {
            require_normal(state, Operation::Accelerate)?;
            let factor = check_factor(t, limits.acc_range)?;
            Ok(Transition {
                state: TickState::Acc { factor },
                reply: String::new(),
                notice: Some(format!("The world will run {factor} times faster")),
            })
        }
    }
}

// ── Invocation planning ──────────────────────────────────────────

/// A transient state that ran to completion during an invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Forwarding drained its count.
    ForwardFinished,
    /// Warp drained its count.
    WarpFinished,
}

impl Completion {
    /// Broadcast text for this completion.
    pub fn notice(self) -> &'static str {
        match self {
            Self::ForwardFinished => "Forward finished",
            Self::WarpFinished => "Warp finished",
        }
    }
}

/// What one external invocation must do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Real steps to run, each followed by the light hook.
    pub steps: u32,
    /// Whether to run the heavy hook once after the steps.
    pub heavy_hook: bool,
    /// Whether this invocation is timed into the latency window and
    /// counts as a profiling round (Normal only).
    pub timed: bool,
    /// Transient state that finished, if any.
    pub completion: Option<Completion>,
}

impl Invocation {
    const IDLE: Self = Self {
        steps: 0,
        heavy_hook: false,
        timed: false,
        completion: None,
    };
}

/// Warp batch size for the current mean step latency.
///
/// `min(cap, floor(budget / mean))`, at least 1 so a slow world still
/// makes progress; an empty latency window (mean 0) uses the cap.
pub fn warp_batch(mean_latency_ms: f64, limits: &PacingConfig) -> u32 {
    if mean_latency_ms <= 0.0 || !mean_latency_ms.is_finite() {
        return limits.warp_batch_cap;
    }
    let fit = (limits.warp_budget_ms / mean_latency_ms).floor();
    if fit >= f64::from(limits.warp_batch_cap) {
        limits.warp_batch_cap
    } else {
        (fit as u32).max(1)
    }
}

/// Advance `state` by one external invocation.
///
/// Returns the state after the invocation and the work to perform. The
/// work is fully determined up front: steps are opaque and cannot fail,
/// so counting them down before running them is equivalent to counting
/// them down one at a time.
pub fn plan_invocation(
    state: &TickState,
    mean_latency_ms: f64,
    limits: &PacingConfig,
) -> (TickState, Invocation) {
    match *state {
        TickState::Normal => (
            TickState::Normal,
            Invocation {
                steps: 1,
                heavy_hook: true,
                timed: true,
                completion: None,
            },
        ),
        TickState::Frozen => (TickState::Frozen, Invocation::IDLE),
        TickState::Forwarding {
            remaining,
            previous,
        } => (
            previous.into(),
            Invocation {
                steps: remaining,
                heavy_hook: true,
                timed: false,
                completion: Some(Completion::ForwardFinished),
            },
        ),
        TickState::Warp {
            remaining,
            previous,
        } => {
            let batch = warp_batch(mean_latency_ms, limits).min(remaining);
            let left = remaining - batch;
            let (next, completion) = if left == 0 {
                (previous.into(), Some(Completion::WarpFinished))
            } else {
                (
                    TickState::Warp {
                        remaining: left,
                        previous,
                    },
                    None,
                )
            };
            (
                next,
                Invocation {
                    steps: batch,
                    heavy_hook: true,
                    timed: false,
                    completion,
                },
            )
        }
        TickState::Acc { factor } => (
            TickState::Acc { factor },
            Invocation {
                steps: factor,
                heavy_hook: true,
                timed: false,
                completion: None,
            },
        ),
        TickState::SlowDown { factor, counter } => {
            let next = TickState::SlowDown {
                factor,
                counter: (counter + 1) % factor.max(1),
            };
            if counter == 0 {
                (
                    next,
                    Invocation {
                        steps: 1,
                        heavy_hook: true,
                        timed: false,
                        completion: None,
                    },
                )
            } else {
                (next, Invocation::IDLE)
            }
        }
    }
}
