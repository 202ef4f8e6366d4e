//! Per-invocation metrics for the tick driver.
//!
//! [`InvocationMetrics`] records what one [`TickDriver::step`] call did, so
//! hosts and tests can observe pacing without instrumenting the source.
//!
//! [`TickDriver::step`]: crate::driver::TickDriver::step

/// What a single external invocation did.
///
/// Durations are in microseconds. The driver fills these in after each
/// `step()` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvocationMetrics {
    /// Real simulation steps run.
    pub real_steps: u32,
    /// Light post-step hooks run (one per real step).
    pub light_hooks: u32,
    /// Heavy post-step hooks run (at most one).
    pub heavy_hooks: u32,
    /// Measured duration of a Normal invocation; `None` for every other
    /// state, which is not timed.
    pub timed_us: Option<u64>,
    /// Whether a profiling session reached its last round during this
    /// invocation.
    pub session_finished: bool,
}

impl InvocationMetrics {
    /// Whether the simulation did not advance.
    pub fn is_idle(&self) -> bool {
        self.real_steps == 0
    }
}
