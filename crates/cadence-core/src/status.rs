//! Flat pacing status discriminants.

use std::fmt;

/// Pacing mode of the tick controller, without the per-mode payload.
///
/// Exactly one status is active at a time. The engine's tagged state
/// carries the mode-specific counters; this enum is what error messages,
/// the profiler's start check and status displays look at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickStatus {
    /// One real step per invocation.
    Normal,
    /// Zero real steps per invocation.
    Frozen,
    /// Runs the remaining steps synchronously in the next invocation.
    Forwarding,
    /// Runs the remaining steps in bounded batches across invocations.
    Warp,
    /// Runs a fixed number of steps per invocation.
    Acc,
    /// Runs one step every N invocations.
    SlowDown,
}

impl fmt::Display for TickStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "Normal",
            Self::Frozen => "Frozen",
            Self::Forwarding => "Forwarding",
            Self::Warp => "Warp",
            Self::Acc => "Acc",
            Self::SlowDown => "SlowDown",
        };
        f.write_str(name)
    }
}

/// A state that Forwarding and Warp can be entered from, and return to.
///
/// Restricting the restore slot to these two variants makes it impossible
/// for a transient state to "restore" into another transient state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RestingState {
    /// Resume normal ticking.
    Normal,
    /// Resume the freeze.
    Frozen,
}

impl RestingState {
    /// Map a status to a resting state, if it is one.
    pub fn from_status(status: TickStatus) -> Option<Self> {
        match status {
            TickStatus::Normal => Some(Self::Normal),
            TickStatus::Frozen => Some(Self::Frozen),
            _ => None,
        }
    }
}

impl From<RestingState> for TickStatus {
    fn from(s: RestingState) -> Self {
        match s {
            RestingState::Normal => TickStatus::Normal,
            RestingState::Frozen => TickStatus::Frozen,
        }
    }
}
