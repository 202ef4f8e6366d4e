//! Tick pacing and profiling engine for Cadence.
//!
//! Provides the [`TickDriver`] context object that a host calls once per
//! external invocation. The driver owns the pacing state machine
//! ([`TickRateController`]), the rolling latency window
//! ([`LatencyRecorder`]), the single-flight [`ProfilingSession`] and the
//! [`ReportGenerator`]. A threaded host, [`RealtimeTicker`], runs the
//! driver at a fixed rate and accepts operator [`Command`]s over a
//! channel.
//!
//! The state machine itself is pure: [`transition`] and
//! [`plan_invocation`] map a state and an event (or an invocation) to the
//! next state without side effects, and the controller commits only what
//! they return.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod broadcast;
pub mod config;
pub mod controller;
pub mod driver;
pub mod latency;
pub mod metrics;
pub mod profiler;
pub mod realtime;
pub mod report;
pub mod state;
pub(crate) mod tick_thread;

pub use broadcast::{NullBroadcaster, TracingBroadcaster};
pub use config::{CadenceConfig, ConfigError, PacingConfig, ProfilerConfig, RealtimeConfig};
pub use controller::TickRateController;
pub use driver::TickDriver;
pub use latency::LatencyRecorder;
pub use metrics::InvocationMetrics;
pub use profiler::{Accumulators, ProfileMode, ProfilingSession, SessionSnapshot};
pub use realtime::{RealtimeTicker, TickerError};
pub use report::ReportGenerator;
pub use state::{
    plan_invocation, transition, Completion, ControlEvent, Invocation, TickState, Transition,
};
pub use tick_thread::Command;
