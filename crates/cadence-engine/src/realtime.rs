//! Threaded host that invokes the driver at a fixed rate.
//!
//! ```text
//! Operator thread(s)                  Tick thread
//!     |                                   |
//!     |--submit(cmd)--------------------->| cmd_rx.try_recv()
//!     |   [cmd_tx: bounded(capacity)]     | cmd.apply(&mut driver)
//!     |<--ActionResult via reply_tx-------| driver.step(&mut source)
//!     |                                   | park(budget - elapsed)
//! ```
//!
//! The driver is never shared, only messaged: the tick thread is the sole
//! owner until [`RealtimeTicker::shutdown`] joins it and hands the driver
//! and source back.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use cadence_core::{ActionResult, Broadcaster, Clock, MonotonicClock, TickSource};
use crossbeam_channel::{Sender, TrySendError};
use tracing::{error, info};

use crate::broadcast::TracingBroadcaster;
use crate::config::{ConfigError, RealtimeConfig};
use crate::driver::TickDriver;
use crate::tick_thread::{Command, Request, TickThreadState};

// ── Error types ──────────────────────────────────────────────────

/// Error talking to, starting, or stopping the tick thread.
#[derive(Debug, PartialEq)]
pub enum TickerError {
    /// The tick thread has shut down.
    Shutdown,
    /// The command channel is full (back-pressure).
    ChannelFull,
    /// The OS refused to start the tick thread.
    ThreadSpawnFailed {
        /// The underlying I/O error, rendered.
        reason: String,
    },
    /// The tick thread panicked; driver and source are lost.
    ThreadPanicked,
    /// The realtime settings are invalid.
    Config(ConfigError),
}

impl fmt::Display for TickerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => write!(f, "tick thread has shut down"),
            Self::ChannelFull => write!(f, "command channel full"),
            Self::ThreadSpawnFailed { reason } => {
                write!(f, "failed to spawn tick thread: {reason}")
            }
            Self::ThreadPanicked => write!(f, "tick thread panicked"),
            Self::Config(e) => write!(f, "invalid realtime config: {e}"),
        }
    }
}

impl std::error::Error for TickerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for TickerError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ── RealtimeTicker ───────────────────────────────────────────────

type Recovered<S, C, B> = (TickDriver<C, B>, S);

/// Runs a [`TickDriver`] against a [`TickSource`] on a dedicated thread.
pub struct RealtimeTicker<S, C = MonotonicClock, B = TracingBroadcaster>
where
    S: TickSource + Send + 'static,
    C: Clock + Send + 'static,
    B: Broadcaster + Send + 'static,
{
    cmd_tx: Option<Sender<Request>>,
    shutdown_flag: Arc<AtomicBool>,
    invocations: Arc<AtomicU64>,
    tick_thread: Option<JoinHandle<Recovered<S, C, B>>>,
}

impl<S, C, B> RealtimeTicker<S, C, B>
where
    S: TickSource + Send + 'static,
    C: Clock + Send + 'static,
    B: Broadcaster + Send + 'static,
{
    /// Move `driver` and `source` onto a new tick thread and start invoking.
    pub fn spawn(
        driver: TickDriver<C, B>,
        source: S,
        config: &RealtimeConfig,
    ) -> Result<Self, TickerError> {
        config.validate()?;

        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let invocations = Arc::new(AtomicU64::new(0));
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(config.command_capacity);

        let state = TickThreadState::new(
            driver,
            source,
            cmd_rx,
            Arc::clone(&shutdown_flag),
            Arc::clone(&invocations),
            config.tick_budget(),
        );
        let tick_thread = thread::Builder::new()
            .name("cadence-tick".into())
            .spawn(move || state.run())
            .map_err(|e| {
                error!(error = %e, "failed to spawn tick thread");
                TickerError::ThreadSpawnFailed {
                    reason: e.to_string(),
                }
            })?;
        info!(rate_hz = config.tick_rate_hz, "realtime ticker started");

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            shutdown_flag,
            invocations,
            tick_thread: Some(tick_thread),
        })
    }

    /// Send `command` to be applied before the next invocation.
    ///
    /// Non-blocking send; blocks only for the reply, which arrives within
    /// one tick period.
    pub fn submit(&self, command: Command) -> Result<ActionResult, TickerError> {
        let cmd_tx = self.cmd_tx.as_ref().ok_or(TickerError::Shutdown)?;

        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let request = Request {
            command,
            reply: reply_tx,
        };
        cmd_tx.try_send(request).map_err(|e| match e {
            TrySendError::Full(_) => TickerError::ChannelFull,
            TrySendError::Disconnected(_) => TickerError::Shutdown,
        })?;

        reply_rx.recv().map_err(|_| TickerError::Shutdown)
    }

    /// External invocations performed so far.
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Acquire)
    }

    /// Stop the tick thread and recover the driver and source.
    pub fn shutdown(mut self) -> Result<Recovered<S, C, B>, TickerError> {
        self.stop().ok_or(TickerError::ThreadPanicked)
    }

    fn stop(&mut self) -> Option<Recovered<S, C, B>> {
        let handle = self.tick_thread.take()?;
        self.shutdown_flag.store(true, Ordering::Release);
        // Wake the thread if it is parked in a budget sleep.
        handle.thread().unpark();
        self.cmd_tx.take();
        let recovered = handle.join().ok();
        info!(
            invocations = self.invocations(),
            joined = recovered.is_some(),
            "realtime ticker stopped"
        );
        recovered
    }
}

impl<S, C, B> Drop for RealtimeTicker<S, C, B>
where
    S: TickSource + Send + 'static,
    C: Clock + Send + 'static,
    B: Broadcaster + Send + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use crate::config::CadenceConfig;
    use cadence_core::TickStatus;
    use cadence_test_utils::{ManualClock, RecordingBroadcaster, ScriptedTickSource};

    type TestTicker = RealtimeTicker<ScriptedTickSource, ManualClock, RecordingBroadcaster>;

    fn fast_config() -> RealtimeConfig {
        RealtimeConfig {
            tick_rate_hz: 200.0,
            ..RealtimeConfig::default()
        }
    }

    fn spawn() -> TestTicker {
        let clock = ManualClock::new();
        let driver = TickDriver::with_parts(
            &CadenceConfig::default(),
            clock.clone(),
            RecordingBroadcaster::new(),
        )
        .unwrap();
        let source = ScriptedTickSource::new(clock).with_step_durations([1_000]);
        RealtimeTicker::spawn(driver, source, &fast_config()).unwrap()
    }

    fn wait_for_invocations(ticker: &TestTicker, n: u64) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while ticker.invocations() < n {
            if Instant::now() > deadline {
                panic!("fewer than {n} invocations within 2s");
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn lifecycle_start_command_shutdown() {
        let ticker = spawn();
        wait_for_invocations(&ticker, 3);

        let r = ticker.submit(Command::Freeze).unwrap();
        assert!(r.success);
        assert_eq!(ticker.submit(Command::Query).unwrap().message, "Frozen");

        let (driver, source) = ticker.shutdown().unwrap();
        assert_eq!(driver.status(), TickStatus::Frozen);
        assert!(source.steps() >= 3);
        assert!(!driver.latency().is_empty());
    }

    #[test]
    fn rejected_command_reaches_caller() {
        let ticker = spawn();
        let r = ticker.submit(Command::Accelerate(11)).unwrap();
        assert!(!r.success);
        assert_eq!(r.message, "times should be limited in [2,10], got 11");
        ticker.shutdown().unwrap();
    }

    #[test]
    fn drop_triggers_shutdown() {
        let ticker = spawn();
        thread::sleep(Duration::from_millis(20));
        drop(ticker);
        // If this doesn't hang, shutdown worked.
    }

    #[test]
    fn shutdown_fast_with_slow_tick_rate() {
        let clock = ManualClock::new();
        let driver = TickDriver::with_parts(
            &CadenceConfig::default(),
            clock.clone(),
            RecordingBroadcaster::new(),
        )
        .unwrap();
        let config = RealtimeConfig {
            tick_rate_hz: 0.5,
            ..RealtimeConfig::default()
        };
        let source = ScriptedTickSource::new(clock);
        let ticker = RealtimeTicker::spawn(driver, source, &config).unwrap();
        wait_for_invocations(&ticker, 1);
        thread::sleep(Duration::from_millis(20));

        let start = Instant::now();
        ticker.shutdown().unwrap();
        let wall_ms = start.elapsed().as_millis();
        assert!(wall_ms < 500, "shutdown took {wall_ms}ms with 0.5Hz tick rate");
    }

    #[test]
    fn invalid_rate_rejected() {
        let driver = TickDriver::new(&CadenceConfig::default()).unwrap();
        let config = RealtimeConfig {
            tick_rate_hz: -1.0,
            ..RealtimeConfig::default()
        };
        let source = ScriptedTickSource::new(ManualClock::new());
        let err = RealtimeTicker::spawn(driver, source, &config).err().unwrap();
        assert!(matches!(
            err,
            TickerError::Config(ConfigError::InvalidRate { .. })
        ));
    }

    #[test]
    fn rate_beyond_duration_range_rejected() {
        let driver = TickDriver::new(&CadenceConfig::default()).unwrap();
        let config = RealtimeConfig {
            tick_rate_hz: 1e-20,
            ..RealtimeConfig::default()
        };
        let source = ScriptedTickSource::new(ManualClock::new());
        let err = RealtimeTicker::spawn(driver, source, &config).err().unwrap();
        assert!(matches!(
            err,
            TickerError::Config(ConfigError::InvalidRate { .. })
        ));
    }
}
