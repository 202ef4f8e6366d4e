//! Engine configuration, validation, and error types.
//!
//! [`CadenceConfig`] gathers every tunable constant of the pacing and
//! profiling core. The defaults reproduce the reference behaviour (20-sample
//! latency window, 45 ms warp budget, 1200-round profiling cap, and so on);
//! [`validate()`](CadenceConfig::validate) checks structural invariants at
//! startup so the hot path never has to.

use std::error::Error;
use std::fmt;
use std::time::Duration;

// ── PacingConfig ───────────────────────────────────────────────────

/// Limits and thresholds of the tick-rate state machine.
#[derive(Clone, Debug, PartialEq)]
pub struct PacingConfig {
    /// `forward(n)` broadcasts a start notice when `n` reaches this. Default: 1200.
    pub forward_notice_threshold: u32,
    /// Upper bound on real steps per Warp invocation. Default: 10.
    pub warp_batch_cap: u32,
    /// Per-invocation time budget Warp sizes its batch against, in ms. Default: 45.0.
    pub warp_budget_ms: f64,
    /// Closed range of accepted slow-down factors. Default: `(2, 64)`.
    pub slow_range: (u32, u32),
    /// Closed range of accepted acceleration factors. Default: `(2, 10)`.
    pub acc_range: (u32, u32),
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            forward_notice_threshold: 1200,
            warp_batch_cap: 10,
            warp_budget_ms: 45.0,
            slow_range: (2, 64),
            acc_range: (2, 10),
        }
    }
}

// ── ProfilerConfig ─────────────────────────────────────────────────

/// Profiling session and report settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfilerConfig {
    /// Largest accepted round count for a session. Default: 1200.
    pub max_rounds: u32,
    /// Number of chunks listed per dimension in a chunk report. Default: 5.
    pub chunk_top_n: usize,
    /// Nominal tick rate; reported TPS never exceeds it. Default: 20.0.
    pub target_tps: f64,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            max_rounds: 1200,
            chunk_top_n: 5,
            target_tps: 20.0,
        }
    }
}

impl ProfilerConfig {
    /// Step duration, in ms, at which the target TPS can just be held.
    pub fn tick_budget_ms(&self) -> f64 {
        1000.0 / self.target_tps
    }
}

// ── RealtimeConfig ─────────────────────────────────────────────────

/// Configuration for [`RealtimeTicker`](crate::realtime::RealtimeTicker).
#[derive(Clone, Debug, PartialEq)]
pub struct RealtimeConfig {
    /// External invocations per second. Default: 20.0.
    pub tick_rate_hz: f64,
    /// Capacity of the operator command channel. Default: 64.
    pub command_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 20.0,
            command_capacity: 64,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`CadenceConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The latency window holds no samples.
    EmptyLatencyWindow,
    /// A closed range is inverted or starts below 2.
    InvalidFactorRange {
        /// Which range.
        name: &'static str,
        /// The configured bounds.
        range: (u32, u32),
    },
    /// A count that must be at least 1 is zero.
    ZeroLimit {
        /// Which limit.
        name: &'static str,
    },
    /// A rate or budget is NaN, infinite, zero, or negative.
    InvalidRate {
        /// Which rate.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLatencyWindow => write!(f, "latency_window must be at least 1"),
            Self::InvalidFactorRange { name, range } => write!(
                f,
                "{name} must satisfy 2 <= min <= max, got [{}, {}]",
                range.0, range.1
            ),
            Self::ZeroLimit { name } => write!(f, "{name} must be at least 1"),
            Self::InvalidRate { name, value } => {
                write!(f, "{name} must be finite and positive, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

// ── CadenceConfig ──────────────────────────────────────────────────

/// Complete configuration for a [`TickDriver`](crate::driver::TickDriver).
#[derive(Clone, Debug, PartialEq)]
pub struct CadenceConfig {
    /// Number of recent step durations kept for MSPT. Default: 20.
    pub latency_window: usize,
    /// State machine limits.
    pub pacing: PacingConfig,
    /// Profiling limits and report shape.
    pub profiler: ProfilerConfig,
    /// Threaded host settings.
    pub realtime: RealtimeConfig,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            latency_window: 20,
            pacing: PacingConfig::default(),
            profiler: ProfilerConfig::default(),
            realtime: RealtimeConfig::default(),
        }
    }
}

fn check_rate(name: &'static str, value: f64) -> Result<(), ConfigError> {
    // Also reject subnormals whose reciprocal overflows.
    if !value.is_finite() || value <= 0.0 || !(1.0 / value).is_finite() {
        return Err(ConfigError::InvalidRate { name, value });
    }
    Ok(())
}

fn check_factor_range(name: &'static str, range: (u32, u32)) -> Result<(), ConfigError> {
    if range.0 < 2 || range.0 > range.1 {
        return Err(ConfigError::InvalidFactorRange { name, range });
    }
    Ok(())
}

impl CadenceConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.latency_window == 0 {
            return Err(ConfigError::EmptyLatencyWindow);
        }

        let p = &self.pacing;
        if p.forward_notice_threshold == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "forward_notice_threshold",
            });
        }
        if p.warp_batch_cap == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "warp_batch_cap",
            });
        }
        check_rate("warp_budget_ms", p.warp_budget_ms)?;
        check_factor_range("slow_range", p.slow_range)?;
        check_factor_range("acc_range", p.acc_range)?;

        let pr = &self.profiler;
        if pr.max_rounds == 0 {
            return Err(ConfigError::ZeroLimit { name: "max_rounds" });
        }
        if pr.chunk_top_n == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "chunk_top_n",
            });
        }
        check_rate("target_tps", pr.target_tps)?;

        self.realtime.validate()
    }
}

impl RealtimeConfig {
    /// Validate the threaded host settings on their own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_rate("tick_rate_hz", self.tick_rate_hz)?;
        // Tiny rates pass the reciprocal check but overflow a Duration.
        if Duration::try_from_secs_f64(1.0 / self.tick_rate_hz).is_err() {
            return Err(ConfigError::InvalidRate {
                name: "tick_rate_hz",
                value: self.tick_rate_hz,
            });
        }
        if self.command_capacity == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "command_capacity",
            });
        }
        Ok(())
    }

    /// Time allotted to one invocation. Saturates at `Duration::MAX` for
    /// rates that [`validate`](Self::validate) rejects.
    pub fn tick_budget(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.tick_rate_hz).unwrap_or(Duration::MAX)
    }
}
