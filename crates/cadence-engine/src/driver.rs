//! The tick driver: one external invocation at a time.
//!
//! [`TickDriver`] is the explicit context object that owns every piece of
//! pacing and profiling state. Hosts call [`step()`](TickDriver::step) once
//! per external invocation and route operator requests to the methods
//! returning [`ActionResult`]. All methods take `&mut self`, so a step and
//! a session change can never overlap.

use cadence_core::{
    ActionResult, Audience, Broadcaster, Clock, MonotonicClock, PhaseSink, Probe, StyledText,
    TickSource, TickStatus,
};
use tracing::{info, warn};

use crate::broadcast::TracingBroadcaster;
use crate::config::{CadenceConfig, ConfigError};
use crate::controller::TickRateController;
use crate::latency::{micros_to_ms, LatencyRecorder};
use crate::metrics::InvocationMetrics;
use crate::profiler::{ProfileMode, ProfilingSession, SessionSnapshot};
use crate::report::ReportGenerator;
use crate::state::{Completion, ControlEvent};

/// Pacing controller, latency window and profiler behind one handle.
pub struct TickDriver<C = MonotonicClock, B = TracingBroadcaster> {
    controller: TickRateController,
    latency: LatencyRecorder,
    session: ProfilingSession,
    reports: ReportGenerator,
    clock: C,
    broadcaster: B,
    tick_budget_ms: f64,
    last_metrics: InvocationMetrics,
}

// Compile-time assertion: TickDriver must be Send so it can move into
// the realtime tick thread.
const _: () = {
    fn _assert_send<T: Send>() {}
    fn _check() {
        _assert_send::<TickDriver>();
    }
};

impl TickDriver {
    /// A driver on the wall clock that logs broadcasts through `tracing`.
    pub fn new(config: &CadenceConfig) -> Result<Self, ConfigError> {
        Self::with_parts(config, MonotonicClock::new(), TracingBroadcaster)
    }
}

impl<C: Clock, B: Broadcaster> TickDriver<C, B> {
    /// A driver using the given clock and broadcaster.
    ///
    /// Validates `config` first; nothing is built from an invalid one.
    pub fn with_parts(
        config: &CadenceConfig,
        clock: C,
        broadcaster: B,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            controller: TickRateController::new(config.pacing.clone()),
            latency: LatencyRecorder::new(config.latency_window),
            session: ProfilingSession::new(config.profiler.max_rounds),
            reports: ReportGenerator::from_config(&config.profiler),
            clock,
            broadcaster,
            tick_budget_ms: config.profiler.tick_budget_ms(),
            last_metrics: InvocationMetrics::default(),
        })
    }

    // ── Invocation ─────────────────────────────────────────────

    /// Perform one external invocation against `source`.
    ///
    /// Only Normal invocations are timed, recorded into the latency
    /// window, instrumented, and counted as profiling rounds.
    pub fn step(&mut self, source: &mut dyn TickSource) -> InvocationMetrics {
        let inv = self.controller.begin_invocation(self.latency.mean_ms());
        let mut metrics = InvocationMetrics {
            real_steps: inv.steps,
            light_hooks: inv.steps,
            heavy_hooks: u32::from(inv.heavy_hook),
            ..InvocationMetrics::default()
        };

        if inv.timed {
            let start = self.clock.now_us();
            {
                let sink: Option<&mut dyn PhaseSink> = if self.session.is_active() {
                    Some(&mut self.session)
                } else {
                    None
                };
                let mut probe = Probe::new(sink, &self.clock);
                source.run_one_step(&mut probe);
            }
            source.light_post_step();
            source.heavy_post_step();
            let elapsed = self.clock.now_us().saturating_sub(start);

            self.latency.push(elapsed);
            metrics.timed_us = Some(elapsed);
            if let Some(snapshot) = self.session.complete_round(elapsed) {
                metrics.session_finished = true;
                self.publish_report(&snapshot);
            }
        } else if inv.steps > 0 || inv.heavy_hook {
            let start = self.clock.now_us();
            let mut probe = Probe::disabled(&self.clock);
            for _ in 0..inv.steps {
                source.run_one_step(&mut probe);
                source.light_post_step();
            }
            if inv.heavy_hook {
                source.heavy_post_step();
            }

            if let Some(completion) = inv.completion {
                let elapsed_ms = micros_to_ms(self.clock.now_us().saturating_sub(start));
                if completion == Completion::ForwardFinished && elapsed_ms > self.tick_budget_ms {
                    warn!(
                        steps = inv.steps,
                        elapsed_ms,
                        budget_ms = self.tick_budget_ms,
                        "forwarding overran the tick budget"
                    );
                }
                info!(steps = inv.steps, ?completion, "transient pacing finished");
                self.notify(completion.notice());
            }
        }

        self.last_metrics = metrics.clone();
        metrics
    }

    // ── Operator requests ──────────────────────────────────────

    /// Current pacing status line.
    pub fn query(&self) -> ActionResult {
        ActionResult::ok(self.controller.query())
    }

    /// Pause the simulation.
    pub fn freeze(&mut self) -> ActionResult {
        self.control(ControlEvent::Freeze)
    }

    /// Return to Normal pacing.
    pub fn reset(&mut self) -> ActionResult {
        self.control(ControlEvent::Reset)
    }

    /// Run `n` ticks in the next invocation.
    pub fn forward(&mut self, n: i64) -> ActionResult {
        self.control(ControlEvent::Forward(n))
    }

    /// Run `n` ticks as fast as the latency budget allows.
    pub fn warp(&mut self, n: i64) -> ActionResult {
        self.control(ControlEvent::Warp(n))
    }

    /// Run one tick every `t` invocations.
    pub fn slow_down(&mut self, t: i64) -> ActionResult {
        self.control(ControlEvent::SlowDown(t))
    }

    /// Run `t` ticks every invocation.
    pub fn accelerate(&mut self, t: i64) -> ActionResult {
        self.control(ControlEvent::Accelerate(t))
    }

    /// Begin a profiling session of `rounds` Normal invocations.
    pub fn start_profiling(&mut self, rounds: i64, mode: ProfileMode) -> ActionResult {
        self.session
            .start(rounds, mode, self.controller.status())
            .map(|()| "Profile Start")
            .into()
    }

    /// End the running session early and broadcast what it collected.
    pub fn stop_profiling(&mut self) -> ActionResult {
        match self.session.stop() {
            Ok(snapshot) => {
                self.publish_report(&snapshot);
                ActionResult::ok("Profile Stop")
            }
            Err(e) => e.into(),
        }
    }

    /// Latency window summary.
    pub fn mspt(&self) -> ActionResult {
        ActionResult::ok(self.reports.latency_summary(&self.latency).to_string())
    }

    fn control(&mut self, event: ControlEvent) -> ActionResult {
        match self.controller.apply(event) {
            Ok(t) => {
                if let Some(notice) = t.notice {
                    self.notify(notice);
                }
                ActionResult::ok(t.reply)
            }
            Err(e) => e.into(),
        }
    }

    fn notify(&mut self, text: impl Into<StyledText>) {
        self.broadcaster.broadcast(&text.into(), Audience::All);
    }

    fn publish_report(&mut self, snapshot: &SessionSnapshot) {
        if let Some(report) = self.reports.render(snapshot) {
            self.broadcaster.broadcast(&report, Audience::All);
        }
    }

    // ── Accessors ──────────────────────────────────────────────

    /// Mean step latency over the window, in ms.
    pub fn mean_mspt(&self) -> f64 {
        self.latency.mean_ms()
    }

    /// Steps per second at the mean latency, capped at the target.
    pub fn mean_tps(&self) -> f64 {
        self.reports.tps(self.mean_mspt())
    }

    /// Current pacing status.
    pub fn status(&self) -> TickStatus {
        self.controller.status()
    }

    /// The pacing controller.
    pub fn controller(&self) -> &TickRateController {
        &self.controller
    }

    /// The latency window.
    pub fn latency(&self) -> &LatencyRecorder {
        &self.latency
    }

    /// The profiling session.
    pub fn session(&self) -> &ProfilingSession {
        &self.session
    }

    /// Metrics from the most recent [`step()`](Self::step).
    pub fn last_metrics(&self) -> &InvocationMetrics {
        &self.last_metrics
    }

    /// The broadcaster.
    pub fn broadcaster(&self) -> &B {
        &self.broadcaster
    }

    /// Mutable access to the broadcaster.
    pub fn broadcaster_mut(&mut self) -> &mut B {
        &mut self.broadcaster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_test_utils::{ManualClock, RecordingBroadcaster, ScriptedTickSource};

    type TestDriver = TickDriver<ManualClock, RecordingBroadcaster>;

    fn driver() -> (TestDriver, ManualClock) {
        let clock = ManualClock::new();
        let d = TickDriver::with_parts(
            &CadenceConfig::default(),
            clock.clone(),
            RecordingBroadcaster::new(),
        )
        .unwrap();
        (d, clock)
    }

    #[test]
    fn invalid_config_rejected() {
        let mut config = CadenceConfig::default();
        config.latency_window = 0;
        assert!(TickDriver::new(&config).is_err());
    }

    #[test]
    fn normal_invocation_is_timed() {
        let (mut d, clock) = driver();
        let mut src = ScriptedTickSource::new(clock).with_step_durations([20_000]);
        let m = d.step(&mut src);
        assert_eq!(m.real_steps, 1);
        assert_eq!(m.heavy_hooks, 1);
        assert_eq!(m.timed_us, Some(20_000));
        assert_eq!(d.latency().len(), 1);
        assert_eq!(d.mean_mspt(), 20.0);
    }

    #[test]
    fn frozen_invocation_does_nothing() {
        let (mut d, clock) = driver();
        let mut src = ScriptedTickSource::new(clock);
        assert!(d.freeze().success);
        let m = d.step(&mut src);
        assert!(m.is_idle());
        assert_eq!(m.heavy_hooks, 0);
        assert_eq!(src.steps(), 0);
        assert!(d.latency().is_empty());
    }

    #[test]
    fn accelerate_runs_factor_steps_untimed() {
        let (mut d, clock) = driver();
        let mut src = ScriptedTickSource::new(clock);
        assert!(d.accelerate(4).success);
        let m = d.step(&mut src);
        assert_eq!(m.real_steps, 4);
        assert_eq!(src.light_hooks(), 4);
        assert_eq!(src.heavy_hooks(), 1);
        assert_eq!(m.timed_us, None);
        assert!(d.latency().is_empty());
    }

    #[test]
    fn forward_completion_is_broadcast() {
        let (mut d, clock) = driver();
        let mut src = ScriptedTickSource::new(clock);
        let reply = d.forward(5);
        assert!(reply.success);
        assert!(d.broadcaster().is_empty());
        d.step(&mut src);
        assert_eq!(src.steps(), 5);
        assert_eq!(d.status(), TickStatus::Normal);
        assert_eq!(d.broadcaster().last_text().as_deref(), Some("Forward finished"));
    }

    #[test]
    fn rejected_request_reports_failure() {
        let (mut d, _) = driver();
        let r = d.slow_down(100);
        assert!(!r.success);
        assert_eq!(r.message, "times should be limited in [2,64], got 100");
        assert_eq!(d.status(), TickStatus::Normal);
    }

    #[test]
    fn profiling_requires_normal() {
        let (mut d, _) = driver();
        d.freeze();
        let r = d.start_profiling(10, ProfileMode::Basics);
        assert!(!r.success);
        assert!(!d.session().is_active());
    }

    #[test]
    fn stop_without_session_fails() {
        let (mut d, _) = driver();
        let r = d.stop_profiling();
        assert!(!r.success);
        assert_eq!(r.message, "No profiling is running");
    }

    #[test]
    fn mspt_summary_over_window() {
        let (mut d, clock) = driver();
        let mut src = ScriptedTickSource::new(clock)
            .with_step_durations([20_000, 22_000, 18_000, 25_000, 19_000]);
        for _ in 0..5 {
            d.step(&mut src);
        }
        assert_eq!(
            d.mspt().message,
            " - MSPT / TPS: 20.800 / 20.0\n - MIN / MAX: 18.000 / 25.000\n"
        );
        assert_eq!(d.mean_tps(), 20.0);
    }
}
