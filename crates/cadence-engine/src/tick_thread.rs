//! Invocation loop and command draining for the realtime ticker.
//!
//! The tick thread owns the [`TickDriver`] and the [`TickSource`]
//! exclusively (moved in via `thread::Builder::spawn`). No locks on the
//! hot path: operator commands arrive via a bounded crossbeam channel and
//! are applied between invocations; each reply goes back on its own
//! single-slot channel.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cadence_core::{ActionResult, Broadcaster, Clock, TickSource};
use crossbeam_channel::{Receiver, Sender};
use tracing::debug;

use crate::driver::TickDriver;
use crate::profiler::ProfileMode;

/// An operator request for a running [`RealtimeTicker`](crate::realtime::RealtimeTicker).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Current pacing status.
    Query,
    /// Pause the simulation.
    Freeze,
    /// Return to Normal pacing.
    Reset,
    /// Run `n` ticks in the next invocation.
    Forward(i64),
    /// Run `n` ticks as fast as the latency budget allows.
    Warp(i64),
    /// Run one tick every `t` invocations.
    SlowDown(i64),
    /// Run `t` ticks every invocation.
    Accelerate(i64),
    /// Begin a profiling session.
    StartProfiling {
        /// Normal invocations to profile.
        rounds: i64,
        /// What to measure.
        mode: ProfileMode,
    },
    /// End the running session early.
    StopProfiling,
    /// Latency window summary.
    Mspt,
}

impl Command {
    /// Apply to `driver`, producing the operator reply.
    pub fn apply<C: Clock, B: Broadcaster>(self, driver: &mut TickDriver<C, B>) -> ActionResult {
        match self {
            Self::Query => driver.query(),
            Self::Freeze => driver.freeze(),
            Self::Reset => driver.reset(),
            Self::Forward(n) => driver.forward(n),
            Self::Warp(n) => driver.warp(n),
            Self::SlowDown(t) => driver.slow_down(t),
            Self::Accelerate(t) => driver.accelerate(t),
            Self::StartProfiling { rounds, mode } => driver.start_profiling(rounds, mode),
            Self::StopProfiling => driver.stop_profiling(),
            Self::Mspt => driver.mspt(),
        }
    }
}

/// A command paired with the channel its reply goes back on.
pub(crate) struct Request {
    pub command: Command,
    pub reply: Sender<ActionResult>,
}

/// State held by the tick thread's main loop.
pub(crate) struct TickThreadState<S, C, B> {
    driver: TickDriver<C, B>,
    source: S,
    cmd_rx: Receiver<Request>,
    shutdown_flag: Arc<AtomicBool>,
    invocations: Arc<AtomicU64>,
    tick_budget: Duration,
}

impl<S, C, B> TickThreadState<S, C, B>
where
    S: TickSource,
    C: Clock,
    B: Broadcaster,
{
    pub fn new(
        driver: TickDriver<C, B>,
        source: S,
        cmd_rx: Receiver<Request>,
        shutdown_flag: Arc<AtomicBool>,
        invocations: Arc<AtomicU64>,
        tick_budget: Duration,
    ) -> Self {
        Self {
            driver,
            source,
            cmd_rx,
            shutdown_flag,
            invocations,
            tick_budget,
        }
    }

    /// Main loop. Runs until `shutdown_flag` is set.
    ///
    /// Consumes self and hands the driver and source back so the caller
    /// can recover them through the `JoinHandle`.
    pub fn run(mut self) -> (TickDriver<C, B>, S) {
        debug!(
            budget_ms = self.tick_budget.as_secs_f64() * 1000.0,
            "tick thread started"
        );
        loop {
            if self.shutdown_flag.load(Ordering::Acquire) {
                break;
            }

            let tick_start = Instant::now();

            self.drain_command_channel();
            self.driver.step(&mut self.source);
            self.invocations.fetch_add(1, Ordering::Release);

            // park_timeout rather than sleep so shutdown can unpark us.
            let elapsed = tick_start.elapsed();
            if let Some(remaining) = self.tick_budget.checked_sub(elapsed) {
                std::thread::park_timeout(remaining);
            }
        }

        // Answer anything still queued so callers don't block forever.
        self.drain_command_channel();
        debug!(
            invocations = self.invocations.load(Ordering::Acquire),
            "tick thread stopped"
        );
        (self.driver, self.source)
    }

    fn drain_command_channel(&mut self) {
        while let Ok(request) = self.cmd_rx.try_recv() {
            let result = request.command.apply(&mut self.driver);
            // Caller may have given up on the reply.
            let _ = request.reply.send(result);
        }
    }
}
