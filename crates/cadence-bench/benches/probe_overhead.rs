//! Criterion micro-benchmarks for probe overhead: one synthetic step with
//! no session, with a session recording every phase, and per mode.

use cadence_bench::{reference_profile, SyntheticWorld};
use cadence_core::{MonotonicClock, Probe, TickSource, TickStatus};
use cadence_engine::{ProfileMode, ProfilingSession};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_inactive(c: &mut Criterion) {
    let clock = MonotonicClock::new();
    let mut world = SyntheticWorld::new(&reference_profile(), 42);

    c.bench_function("step_probe_inactive", |b| {
        b.iter(|| {
            let mut probe = Probe::disabled(&clock);
            world.run_one_step(&mut probe);
            black_box(world.checksum());
        });
    });
}

fn bench_active(c: &mut Criterion) {
    let clock = MonotonicClock::new();
    let mut world = SyntheticWorld::new(&reference_profile(), 42);

    let mut group = c.benchmark_group("step_probe_active");
    for mode in [ProfileMode::Basics, ProfileMode::Entity, ProfileMode::Chunk] {
        group.bench_function(mode.to_string(), |b| {
            b.iter(|| {
                let mut session = ProfilingSession::default();
                session.start(1200, mode, TickStatus::Normal).unwrap();
                {
                    let mut probe = Probe::new(Some(&mut session), &clock);
                    world.run_one_step(&mut probe);
                }
                black_box(session.complete_round(0));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_inactive, bench_active);
criterion_main!(benches);
