//! Core types and traits for the Cadence tick pacing and profiling core.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the engine, the host integration and the test
//! doubles: world identifiers, the control error taxonomy, operator-facing
//! results and styled text, and the capability traits through which the
//! engine reaches the outside world ([`TickSource`], [`Broadcaster`],
//! [`Clock`], [`PhaseSink`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod error;
pub mod id;
pub mod probe;
pub mod status;
pub mod text;
pub mod traits;

pub use action::ActionResult;
pub use error::{ControlError, Operation};
pub use id::{ChunkPos, Dimension};
pub use probe::{Phase, Probe};
pub use status::{RestingState, TickStatus};
pub use text::{Segment, Style, StyledText};
pub use traits::{Audience, Broadcaster, Clock, MonotonicClock, PhaseSink, TickSource};
