//! Round-bounded profiling sessions.
//!
//! A [`ProfilingSession`] collects per-phase durations for a fixed number of
//! Normal-state invocations ("rounds"). Only one session runs at a time. The
//! accumulator shape depends on the [`ProfileMode`]: each mode owns one
//! [`Accumulators`] variant, and a phase sample is routed into it or
//! dropped, never checked against unrelated fields.
//!
//! The session is reset, not freed, between runs: [`stop`] hands the
//! collected data out as a [`SessionSnapshot`] and leaves an empty Basics
//! payload behind.
//!
//! [`stop`]: ProfilingSession::stop

use std::fmt;
use std::mem;
use std::str::FromStr;

use cadence_core::{ChunkPos, ControlError, Dimension, Phase, PhaseSink, TickStatus};
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use tracing::debug;

// ── ProfileMode ──────────────────────────────────────────────────

/// What a profiling session measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ProfileMode {
    /// Whole-tick breakdown by subsystem.
    #[default]
    Basics,
    /// Per actor type, per dimension.
    Entity,
    /// Per chunk, per dimension.
    Chunk,
    /// Scheduled block ticks. Collected but not reported.
    PendingTick,
}

impl fmt::Display for ProfileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Basics => "basics",
            Self::Entity => "entity",
            Self::Chunk => "chunk",
            Self::PendingTick => "pending-tick",
        };
        f.write_str(name)
    }
}

/// Error parsing a [`ProfileMode`] name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown profiling mode '{}'", self.0)
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for ProfileMode {
    type Err = UnknownMode;

    /// Accepts the canonical names and the short operator aliases
    /// (`normal`, `continue`, `actor`, `pt`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basics" | "normal" | "continue" => Ok(Self::Basics),
            "entity" | "actor" => Ok(Self::Entity),
            "chunk" => Ok(Self::Chunk),
            "pending-tick" | "pt" => Ok(Self::PendingTick),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

// ── Accumulators ─────────────────────────────────────────────────

/// Redstone phase totals, in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RedstoneTimes {
    /// Signal propagation.
    pub signal: u64,
    /// Component insertion queue.
    pub pending_add: u64,
    /// Component update queue.
    pub pending_update: u64,
    /// Component removal.
    pub pending_remove: u64,
}

impl RedstoneTimes {
    /// Sum of all four phases.
    pub fn sum(&self) -> u64 {
        self.signal + self.pending_add + self.pending_update + self.pending_remove
    }
}

/// Chunk tick totals, in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkTimes {
    /// Whole chunk ticks.
    pub total: u64,
    /// Block entities within chunk ticks.
    pub block_entities: u64,
    /// Random ticks within chunk ticks.
    pub random_tick: u64,
    /// Scheduled ticks within chunk ticks.
    pub pending_tick: u64,
}

/// Payload of a Basics session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BasicsData {
    /// Whole-invocation time of every Normal round.
    pub server_level: u64,
    /// Redstone phases.
    pub redstone: RedstoneTimes,
    /// Entity systems pass.
    pub entity_systems: u64,
    /// Dimension housekeeping.
    pub dimension: u64,
    /// Chunk ticks.
    pub chunk: ChunkTimes,
    /// Every chunk ticked at least once.
    pub chunks_seen: IndexSet<(Dimension, ChunkPos)>,
}

impl BasicsData {
    /// Number of distinct chunks ticked during the session.
    pub fn chunk_count(&self) -> usize {
        self.chunks_seen.len()
    }
}

/// Accumulated time and invocation count for one actor type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActorStats {
    /// Total tick time, in microseconds.
    pub time_us: u64,
    /// Number of actor ticks.
    pub count: u64,
}

/// Payload of an Entity session: actor type name to stats, per dimension.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityData {
    /// Indexed by [`Dimension::index`]; insertion ordered.
    pub per_dimension: [IndexMap<String, ActorStats>; Dimension::COUNT],
}

impl EntityData {
    fn record(&mut self, dimension: Dimension, type_name: &str, duration_us: u64) {
        let map = &mut self.per_dimension[dimension.index()];
        // Only allocate the key the first time a type shows up.
        let stats = match map.get_mut(type_name) {
            Some(stats) => stats,
            None => map.entry(type_name.to_string()).or_default(),
        };
        stats.time_us += duration_us;
        stats.count += 1;
    }
}

/// Per-invocation durations of one chunk. Most chunks tick once per round,
/// so short sessions stay inline.
pub type ChunkSamples = SmallVec<[u64; 8]>;

/// Payload of a Chunk session: chunk coordinate to samples, per dimension.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkData {
    /// Indexed by [`Dimension::index`]; insertion ordered.
    pub per_dimension: [IndexMap<ChunkPos, ChunkSamples>; Dimension::COUNT],
}

/// Payload of a PendingTick session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingTickData {
    /// Scheduled block tick time, in microseconds.
    pub total_us: u64,
}

/// Mode-specific accumulator payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Accumulators {
    /// See [`BasicsData`].
    Basics(BasicsData),
    /// See [`EntityData`].
    Entity(EntityData),
    /// See [`ChunkData`].
    Chunk(ChunkData),
    /// See [`PendingTickData`].
    PendingTick(PendingTickData),
}

impl Accumulators {
    /// An empty payload for `mode`.
    pub fn empty(mode: ProfileMode) -> Self {
        match mode {
            ProfileMode::Basics => Self::Basics(BasicsData::default()),
            ProfileMode::Entity => Self::Entity(EntityData::default()),
            ProfileMode::Chunk => Self::Chunk(ChunkData::default()),
            ProfileMode::PendingTick => Self::PendingTick(PendingTickData::default()),
        }
    }

    /// The mode this payload belongs to.
    pub fn mode(&self) -> ProfileMode {
        match self {
            Self::Basics(_) => ProfileMode::Basics,
            Self::Entity(_) => ProfileMode::Entity,
            Self::Chunk(_) => ProfileMode::Chunk,
            Self::PendingTick(_) => ProfileMode::PendingTick,
        }
    }

    /// Route a phase sample. Phases the mode does not report are dropped.
    pub fn record(&mut self, phase: Phase<'_>, us: u64) {
        match self {
            Self::Basics(b) => match phase {
                Phase::RedstoneSignal => b.redstone.signal += us,
                Phase::RedstonePendingAdd => b.redstone.pending_add += us,
                Phase::RedstonePendingUpdate => b.redstone.pending_update += us,
                Phase::RedstonePendingRemove => b.redstone.pending_remove += us,
                Phase::Dimension => b.dimension += us,
                Phase::EntitySystems => b.entity_systems += us,
                Phase::ChunkTick { dimension, pos } => {
                    b.chunk.total += us;
                    b.chunks_seen.insert((dimension, pos));
                }
                Phase::BlockEntities => b.chunk.block_entities += us,
                Phase::RandomTick => b.chunk.random_tick += us,
                Phase::PendingTicks => b.chunk.pending_tick += us,
                Phase::Actor { .. } => {}
            },
            Self::Entity(e) => {
                if let Phase::Actor {
                    dimension,
                    type_name,
                } = phase
                {
                    e.record(dimension, type_name, us);
                }
            }
            Self::Chunk(c) => {
                if let Phase::ChunkTick { dimension, pos } = phase {
                    c.per_dimension[dimension.index()]
                        .entry(pos)
                        .or_default()
                        .push(us);
                }
            }
            Self::PendingTick(p) => {
                if let Phase::PendingTicks = phase {
                    p.total_us += us;
                }
            }
        }
    }

    fn add_server_level(&mut self, us: u64) {
        if let Self::Basics(b) = self {
            b.server_level += us;
        }
    }
}

impl Default for Accumulators {
    fn default() -> Self {
        Self::empty(ProfileMode::Basics)
    }
}

// ── SessionSnapshot ──────────────────────────────────────────────

/// Data handed out by a stopped session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Completed rounds the data covers. Reports average over this.
    pub rounds: u32,
    /// Collected payload.
    pub data: Accumulators,
}

impl SessionSnapshot {
    /// The session's mode.
    pub fn mode(&self) -> ProfileMode {
        self.data.mode()
    }
}

// ── ProfilingSession ─────────────────────────────────────────────

/// Single-flight profiling session.
#[derive(Clone, Debug)]
pub struct ProfilingSession {
    active: bool,
    current_round: u32,
    total_round: u32,
    max_rounds: u32,
    data: Accumulators,
}

impl ProfilingSession {
    /// An idle session accepting round counts in `[1, max_rounds]`.
    pub fn new(max_rounds: u32) -> Self {
        Self {
            active: false,
            current_round: 0,
            total_round: 0,
            max_rounds,
            data: Accumulators::default(),
        }
    }

    /// Begin collecting for `rounds` Normal invocations.
    ///
    /// `status` is the controller's status at the time of the request.
    /// Checks run in order: round range, controller state, conflict. A
    /// rejected start leaves a running session untouched.
    pub fn start(
        &mut self,
        rounds: i64,
        mode: ProfileMode,
        status: TickStatus,
    ) -> Result<(), ControlError> {
        ControlError::check_range("rounds", rounds, 1, i64::from(self.max_rounds))?;
        if status != TickStatus::Normal {
            return Err(ControlError::WrongControllerState { status });
        }
        if self.active {
            return Err(ControlError::SessionConflict);
        }
        debug!(rounds, %mode, "begin profiling");
        self.data = Accumulators::empty(mode);
        self.active = true;
        self.current_round = 0;
        // In range, so it fits.
        self.total_round = rounds as u32;
        Ok(())
    }

    /// Close one Normal round of `server_level_us`.
    ///
    /// Returns the finished snapshot when this was the last round.
    pub fn complete_round(&mut self, server_level_us: u64) -> Option<SessionSnapshot> {
        if !self.active {
            return None;
        }
        self.data.add_server_level(server_level_us);
        self.current_round += 1;
        if self.current_round == self.total_round {
            return Some(self.finish());
        }
        None
    }

    /// End the session early.
    pub fn stop(&mut self) -> Result<SessionSnapshot, ControlError> {
        if !self.active {
            return Err(ControlError::NoActiveSession);
        }
        Ok(self.finish())
    }

    fn finish(&mut self) -> SessionSnapshot {
        debug!(
            rounds = self.current_round,
            total = self.total_round,
            mode = %self.data.mode(),
            "stop profiling"
        );
        self.active = false;
        let snapshot = SessionSnapshot {
            rounds: self.current_round,
            data: mem::take(&mut self.data),
        };
        self.current_round = 0;
        self.total_round = 0;
        snapshot
    }

    /// Whether a session is running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Mode of the running session, or Basics when idle.
    pub fn mode(&self) -> ProfileMode {
        self.data.mode()
    }

    /// Rounds completed so far.
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Round target of the running session, or 0 when idle.
    pub fn total_round(&self) -> u32 {
        self.total_round
    }

    /// Live accumulators.
    pub fn data(&self) -> &Accumulators {
        &self.data
    }
}

impl Default for ProfilingSession {
    fn default() -> Self {
        Self::new(1200)
    }
}

impl PhaseSink for ProfilingSession {
    fn record(&mut self, phase: Phase<'_>, duration_us: u64) {
        if self.active {
            self.data.record(phase, duration_us);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(mode: ProfileMode, rounds: i64) -> ProfilingSession {
        let mut s = ProfilingSession::default();
        s.start(rounds, mode, TickStatus::Normal).unwrap();
        s
    }

    #[test]
    fn round_bounds() {
        let mut s = ProfilingSession::default();
        for r in [0, 1201, -1] {
            assert!(matches!(
                s.start(r, ProfileMode::Basics, TickStatus::Normal),
                Err(ControlError::InvalidParameterRange { .. })
            ));
            assert!(!s.is_active());
        }
        for r in [1, 1200] {
            let mut s = ProfilingSession::default();
            assert!(s.start(r, ProfileMode::Basics, TickStatus::Normal).is_ok());
            assert_eq!(s.total_round(), r as u32);
        }
    }

    #[test]
    fn start_requires_normal() {
        let mut s = ProfilingSession::default();
        assert_eq!(
            s.start(10, ProfileMode::Basics, TickStatus::Acc),
            Err(ControlError::WrongControllerState {
                status: TickStatus::Acc
            })
        );
    }

    #[test]
    fn second_start_conflicts_and_keeps_data() {
        let mut s = started(ProfileMode::Basics, 10);
        s.record(Phase::Dimension, 300);
        s.complete_round(1000);
        assert_eq!(
            s.start(5, ProfileMode::Chunk, TickStatus::Normal),
            Err(ControlError::SessionConflict)
        );
        assert_eq!(s.mode(), ProfileMode::Basics);
        assert_eq!(s.current_round(), 1);
        match s.data() {
            Accumulators::Basics(b) => {
                assert_eq!(b.dimension, 300);
                assert_eq!(b.server_level, 1000);
            }
            other => panic!("expected Basics, got {other:?}"),
        }
    }

    #[test]
    fn auto_stop_on_last_round() {
        let mut s = started(ProfileMode::Basics, 3);
        assert!(s.complete_round(10).is_none());
        assert!(s.complete_round(10).is_none());
        let snap = s.complete_round(10).expect("third round finishes");
        assert_eq!(snap.rounds, 3);
        assert!(!s.is_active());
        assert_eq!(s.mode(), ProfileMode::Basics);
        assert!(s.complete_round(10).is_none());
    }

    #[test]
    fn explicit_stop_covers_completed_rounds() {
        let mut s = started(ProfileMode::Entity, 100);
        s.complete_round(5);
        s.complete_round(5);
        let snap = s.stop().unwrap();
        assert_eq!(snap.rounds, 2);
        assert_eq!(snap.mode(), ProfileMode::Entity);
        assert_eq!(s.stop(), Err(ControlError::NoActiveSession));
    }

    #[test]
    fn idle_session_ignores_samples() {
        let mut s = ProfilingSession::default();
        s.record(Phase::Dimension, 99);
        assert_eq!(s.data(), &Accumulators::default());
    }

    #[test]
    fn entity_mode_ignores_redstone() {
        let mut s = started(ProfileMode::Entity, 5);
        s.record(Phase::RedstoneSignal, 1000);
        s.record(
            Phase::Actor {
                dimension: Dimension::Overworld,
                type_name: "zombie",
            },
            40,
        );
        s.record(
            Phase::Actor {
                dimension: Dimension::Overworld,
                type_name: "zombie",
            },
            60,
        );
        match s.data() {
            Accumulators::Entity(e) => {
                let z = e.per_dimension[0]["zombie"];
                assert_eq!(z, ActorStats { time_us: 100, count: 2 });
                assert!(e.per_dimension[1].is_empty());
            }
            other => panic!("expected Entity, got {other:?}"),
        }
    }

    #[test]
    fn basics_counts_distinct_chunks() {
        let mut s = started(ProfileMode::Basics, 5);
        let a = Phase::ChunkTick {
            dimension: Dimension::Overworld,
            pos: ChunkPos::new(0, 0),
        };
        let b = Phase::ChunkTick {
            dimension: Dimension::Nether,
            pos: ChunkPos::new(0, 0),
        };
        s.record(a, 10);
        s.record(a, 10);
        s.record(b, 5);
        s.record(Phase::BlockEntities, 3);
        s.record(
            Phase::Actor {
                dimension: Dimension::Overworld,
                type_name: "cow",
            },
            7,
        );
        match s.data() {
            Accumulators::Basics(d) => {
                assert_eq!(d.chunk_count(), 2);
                assert_eq!(d.chunk.total, 25);
                assert_eq!(d.chunk.block_entities, 3);
            }
            other => panic!("expected Basics, got {other:?}"),
        }
    }

    #[test]
    fn chunk_mode_keeps_per_invocation_samples() {
        let mut s = started(ProfileMode::Chunk, 5);
        let pos = ChunkPos::new(3, -2);
        for us in [100, 300] {
            s.record(
                Phase::ChunkTick {
                    dimension: Dimension::TheEnd,
                    pos,
                },
                us,
            );
        }
        s.record(Phase::RandomTick, 50);
        match s.data() {
            Accumulators::Chunk(c) => {
                assert_eq!(c.per_dimension[2][&pos].as_slice(), &[100, 300]);
            }
            other => panic!("expected Chunk, got {other:?}"),
        }
    }

    #[test]
    fn pending_tick_mode_collects_only_pending_ticks() {
        let mut s = started(ProfileMode::PendingTick, 5);
        s.record(Phase::PendingTicks, 12);
        s.record(Phase::Dimension, 1000);
        assert_eq!(
            s.data(),
            &Accumulators::PendingTick(PendingTickData { total_us: 12 })
        );
    }

    #[test]
    fn server_level_only_lands_in_basics() {
        let mut s = started(ProfileMode::Chunk, 2);
        s.complete_round(5000);
        let snap = s.complete_round(5000).unwrap();
        assert_eq!(snap.data, Accumulators::Chunk(ChunkData::default()));
    }

    #[test]
    fn mode_names_parse() {
        assert_eq!("continue".parse(), Ok(ProfileMode::Basics));
        assert_eq!("actor".parse(), Ok(ProfileMode::Entity));
        assert_eq!("Chunk".parse(), Ok(ProfileMode::Chunk));
        assert_eq!("pt".parse(), Ok(ProfileMode::PendingTick));
        assert_eq!(
            "village".parse::<ProfileMode>(),
            Err(UnknownMode("village".to_string()))
        );
    }
}
