//! Synthetic workloads for benchmarking and exercising Cadence.
//!
//! Provides [`SyntheticWorld`], a seeded [`TickSource`] that does a fixed
//! amount of arithmetic per phase and reports every phase through the
//! probe, plus two ready-made profiles:
//!
//! - [`reference_profile`]: 3 dimensions, 300 chunks, 4 actors per chunk
//! - [`stress_profile`]: 10x the chunks of the reference profile

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::hint::black_box;

use cadence_core::{ChunkPos, Dimension, Phase, Probe, TickSource};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Actor type names the synthetic world populates chunks with.
pub const ACTOR_TYPES: [&str; 6] = [
    "minecraft:zombie",
    "minecraft:skeleton",
    "minecraft:creeper",
    "minecraft:cow",
    "minecraft:villager",
    "minecraft:item",
];

/// Shape of a synthetic world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldProfile {
    /// Loaded chunks in Overworld, Nether and The end.
    pub chunks_per_dimension: [usize; Dimension::COUNT],
    /// Actors placed in every chunk.
    pub actors_per_chunk: usize,
    /// Arithmetic rounds per unit of simulated work.
    pub work: u32,
}

/// 300 chunks (200/60/40), 4 actors each.
pub fn reference_profile() -> WorldProfile {
    WorldProfile {
        chunks_per_dimension: [200, 60, 40],
        actors_per_chunk: 4,
        work: 64,
    }
}

/// 3000 chunks, same density as [`reference_profile`].
pub fn stress_profile() -> WorldProfile {
    WorldProfile {
        chunks_per_dimension: [2000, 600, 400],
        actors_per_chunk: 4,
        work: 64,
    }
}

/// A deterministic fake simulation.
///
/// Chunks are laid out row-major on a 32-wide grid centred on the origin.
/// Actor types are drawn from [`ACTOR_TYPES`] with a seeded ChaCha8 RNG,
/// so two worlds built from the same profile and seed are identical.
pub struct SyntheticWorld {
    chunks: Vec<(Dimension, ChunkPos)>,
    /// Actor type indices, `actors_per_chunk` per chunk in chunk order.
    actors: Vec<usize>,
    actors_per_chunk: usize,
    rng: ChaCha8Rng,
    work: u32,
    state: u64,
    steps: u64,
}

impl SyntheticWorld {
    /// Build a world from `profile`, seeding actor placement and per-step
    /// jitter with `seed`.
    pub fn new(profile: &WorldProfile, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut chunks = Vec::new();
        let mut actors = Vec::new();
        for dim in Dimension::ALL {
            for i in 0..profile.chunks_per_dimension[dim.index()] {
                let x = (i % 32) as i32 - 16;
                let z = (i / 32) as i32 - 16;
                chunks.push((dim, ChunkPos::new(x, z)));
                for _ in 0..profile.actors_per_chunk {
                    let kind = rng.next_u32() as usize % ACTOR_TYPES.len();
                    actors.push(kind);
                }
            }
        }
        Self {
            chunks,
            actors,
            actors_per_chunk: profile.actors_per_chunk,
            rng,
            work: profile.work,
            state: seed,
            steps: 0,
        }
    }

    /// Loaded chunks across all dimensions.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of actors of `type_name` in `dimension`.
    pub fn actor_count(&self, dimension: Dimension, type_name: &str) -> usize {
        let per_chunk = self.actors_per_chunk;
        self.chunks
            .iter()
            .enumerate()
            .filter(|(_, (d, _))| *d == dimension)
            .flat_map(|(i, _)| &self.actors[i * per_chunk..(i + 1) * per_chunk])
            .filter(|&&k| ACTOR_TYPES[k] == type_name)
            .count()
    }

    /// Steps run so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Running checksum of all simulated work.
    pub fn checksum(&self) -> u64 {
        self.state
    }

    fn churn(state: &mut u64, rounds: u32) {
        for _ in 0..rounds {
            *state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
        }
        black_box(*state);
    }
}

impl TickSource for SyntheticWorld {
    fn run_one_step(&mut self, probe: &mut Probe<'_>) {
        self.steps += 1;
        let work = self.work;
        let jitter = self.rng.next_u32() % (work.max(1));
        let state = &mut self.state;

        probe.time(Phase::RedstoneSignal, || Self::churn(state, work + jitter));
        probe.time(Phase::RedstonePendingAdd, || Self::churn(state, work / 4));
        probe.time(Phase::RedstonePendingUpdate, || Self::churn(state, work / 4));
        probe.time(Phase::RedstonePendingRemove, || Self::churn(state, work / 8));
        probe.time(Phase::Dimension, || Self::churn(state, work));
        probe.time(Phase::EntitySystems, || Self::churn(state, work * 2));

        let per_chunk = self.actors_per_chunk;
        for (i, &(dimension, pos)) in self.chunks.iter().enumerate() {
            let chunk = probe.begin();
            probe.time(Phase::BlockEntities, || Self::churn(state, work / 2));
            probe.time(Phase::RandomTick, || Self::churn(state, work / 2));
            probe.time(Phase::PendingTicks, || Self::churn(state, work / 4));
            for &kind in &self.actors[i * per_chunk..(i + 1) * per_chunk] {
                let phase = Phase::Actor {
                    dimension,
                    type_name: ACTOR_TYPES[kind],
                };
                probe.time(phase, || Self::churn(state, work));
            }
            probe.end(Phase::ChunkTick { dimension, pos }, chunk);
        }
    }
}
