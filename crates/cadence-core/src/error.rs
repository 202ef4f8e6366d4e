//! Error types for the Cadence pacing and profiling core.
//!
//! Every failure here is recoverable and local: operations validate first,
//! return one of these values, and leave the controller and session state
//! untouched. The `Display` text is what the operator sees.

use std::error::Error;
use std::fmt;

use crate::status::TickStatus;

/// A pacing operation that can be rejected by the current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Pause the simulation.
    Freeze,
    /// Run N ticks synchronously in one invocation.
    Forward,
    /// Run N ticks in bounded batches.
    Warp,
    /// Run one tick every N invocations.
    SlowDown,
    /// Run N ticks per invocation.
    Accelerate,
}

impl Operation {
    /// Human-readable list of the states this operation is legal from.
    fn allowed_from(self) -> &'static str {
        match self {
            Self::Freeze => "any state except freeze",
            Self::Forward | Self::Warp => "normal or freeze mode",
            Self::SlowDown | Self::Accelerate => "normal mode",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Freeze => "Freeze",
            Self::Forward => "Forward",
            Self::Warp => "Warp",
            Self::SlowDown => "Slow",
            Self::Accelerate => "Acc",
        }
    }
}

/// Errors from tick pacing and profiling operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlError {
    /// The operation is not legal from the current controller status.
    InvalidStateTransition {
        /// The rejected operation.
        operation: Operation,
        /// Status at the time of the request.
        status: TickStatus,
    },
    /// A numeric argument is outside its closed interval.
    InvalidParameterRange {
        /// Name of the offending argument.
        parameter: &'static str,
        /// The rejected value.
        value: i64,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
    /// A profiling session is already running.
    SessionConflict,
    /// Profiling was requested while the controller is not in Normal.
    WrongControllerState {
        /// Status at the time of the request.
        status: TickStatus,
    },
    /// A stop was requested but no profiling session is running.
    NoActiveSession,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStateTransition {
                operation: Operation::Freeze,
                ..
            } => write!(f, "Already in freeze status"),
            Self::InvalidStateTransition { operation, status } => write!(
                f,
                "{} can only be used on {} (current: {status})",
                operation.name(),
                operation.allowed_from()
            ),
            Self::InvalidParameterRange {
                parameter,
                value,
                min,
                max,
            } => write!(
                f,
                "{parameter} should be limited in [{min},{max}], got {value}"
            ),
            Self::SessionConflict => write!(f, "Another profiling is running"),
            Self::WrongControllerState { status } => write!(
                f,
                "Profiling can only be performed in normal tick state (current: {status})"
            ),
            Self::NoActiveSession => write!(f, "No profiling is running"),
        }
    }
}

impl Error for ControlError {}

impl ControlError {
    /// Check `value` against `[min, max]`, naming the argument on failure.
    pub fn check_range(
        parameter: &'static str,
        value: i64,
        min: i64,
        max: i64,
    ) -> Result<(), Self> {
        if value < min || value > max {
            return Err(Self::InvalidParameterRange {
                parameter,
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}
