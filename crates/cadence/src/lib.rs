//! Cadence: tick pacing and tick profiling for fixed-rate simulations.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Cadence sub-crates. For most users, adding `cadence` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use cadence::prelude::*;
//!
//! // A simulation whose whole step is one entity-systems pass.
//! struct Counter(u64);
//! impl TickSource for Counter {
//!     fn run_one_step(&mut self, probe: &mut Probe<'_>) {
//!         probe.time(Phase::EntitySystems, || self.0 += 1);
//!     }
//! }
//!
//! let mut driver = TickDriver::with_parts(
//!     &CadenceConfig::default(),
//!     MonotonicClock::new(),
//!     NullBroadcaster,
//! )
//! .unwrap();
//! let mut world = Counter(0);
//!
//! assert!(driver.accelerate(3).success);
//! driver.step(&mut world);
//! assert_eq!(world.0, 3);
//! assert_eq!(driver.query().message, "3 times faster");
//!
//! let rejected = driver.warp(100);
//! assert!(!rejected.success);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cadence-core` | IDs, phases, errors, styled text, capability traits |
//! | [`engine`] | `cadence-engine` | Pacing state machine, latency window, profiler, reports, driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`cadence-core`).
///
/// Contains world identifiers, the [`types::Phase`] taxonomy, the control
/// error type, and the traits through which the engine reaches the host
/// ([`types::TickSource`], [`types::Broadcaster`], [`types::Clock`]).
pub use cadence_core as types;

/// Pacing and profiling engine (`cadence-engine`).
///
/// [`engine::TickDriver`] for hosts that own their loop,
/// [`engine::RealtimeTicker`] for a dedicated fixed-rate thread.
pub use cadence_engine as engine;

/// Common imports for typical Cadence usage.
///
/// ```rust
/// use cadence::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use cadence_core::{
        ActionResult, Audience, Broadcaster, ChunkPos, Clock, Dimension, MonotonicClock, Phase,
        PhaseSink, Probe, StyledText, TickSource, TickStatus,
    };

    // Errors
    pub use cadence_core::ControlError;
    pub use cadence_engine::{ConfigError, TickerError};

    // Engine
    pub use cadence_engine::{
        CadenceConfig, Command, InvocationMetrics, NullBroadcaster, ProfileMode, RealtimeTicker,
        TickDriver, TracingBroadcaster,
    };
}
