//! Rendering of finished profiling sessions and the latency summary.
//!
//! Everything here is a pure function of its input; the driver decides
//! where the text goes.

use std::cmp::Ordering;

use cadence_core::{ChunkPos, Dimension, StyledText};

use crate::config::ProfilerConfig;
use crate::latency::{micros_to_ms, LatencyRecorder};
use crate::profiler::{Accumulators, BasicsData, ChunkData, EntityData, SessionSnapshot};

/// Turns session snapshots into operator-facing text.
#[derive(Clone, Debug)]
pub struct ReportGenerator {
    top_n: usize,
    target_tps: f64,
}

impl ReportGenerator {
    /// A generator listing `top_n` chunks per dimension and capping TPS
    /// at `target_tps`.
    pub fn new(top_n: usize, target_tps: f64) -> Self {
        Self { top_n, target_tps }
    }

    /// Build from the profiler section of the configuration.
    pub fn from_config(config: &ProfilerConfig) -> Self {
        Self::new(config.chunk_top_n, config.target_tps)
    }

    /// Render a snapshot.
    ///
    /// Returns `None` when the snapshot covers no completed round, and for
    /// PendingTick sessions, which have no report format.
    pub fn render(&self, snapshot: &SessionSnapshot) -> Option<StyledText> {
        if snapshot.rounds == 0 {
            return None;
        }
        let rounds = snapshot.rounds;
        match &snapshot.data {
            Accumulators::Basics(b) => Some(self.basics(b, rounds)),
            Accumulators::Entity(e) => Some(entity(e, rounds)),
            Accumulators::Chunk(c) => Some(self.chunks(c)),
            Accumulators::PendingTick(_) => None,
        }
    }

    fn basics(&self, b: &BasicsData, rounds: u32) -> StyledText {
        let divide = 1000.0 * f64::from(rounds);
        let ms = |us: u64| us as f64 / divide;
        let mspt = ms(b.server_level);
        let tps = self.basics_tps(mspt);
        let text = format!(
            "- MSPT: {:.3} ms TPS: {} Chunks: {}\n\
             - Redstone: {:.3} ms\n\
             \x20 - Signal: {:.3} ms\n\
             \x20 - Add: {:.3} ms\n\
             \x20 - Update: {:.3} ms\n\
             \x20 - Remove: {:.3} ms\n\
             - EntitySystems: {:.3} ms\n\
             - Chunk (un)load & village: {:.3} ms\n\
             - Chunk tick: {:.3} ms\n\
             \x20 - BlockEntities: {:.3} ms\n\
             \x20 - RandomTick: {:.3} ms\n\
             \x20 - PendingTick: {:.3} ms\n",
            mspt,
            tps,
            b.chunk_count(),
            ms(b.redstone.sum()),
            ms(b.redstone.signal),
            ms(b.redstone.pending_add),
            ms(b.redstone.pending_update),
            ms(b.redstone.pending_remove),
            ms(b.entity_systems),
            ms(b.dimension),
            ms(b.chunk.total),
            ms(b.chunk.block_entities),
            ms(b.chunk.random_tick),
            ms(b.chunk.pending_tick),
        );
        StyledText::from(text)
    }

    /// Integer TPS: the target while within budget, else the whole
    /// number of steps that fit in a second.
    fn basics_tps(&self, mspt: f64) -> u32 {
        let budget = 1000.0 / self.target_tps;
        if mspt <= budget {
            self.target_tps as u32
        } else {
            (1000.0 / mspt) as u32
        }
    }

    fn chunks(&self, c: &ChunkData) -> StyledText {
        let mut out = StyledText::new();
        for dim in Dimension::ALL {
            let data = &c.per_dimension[dim.index()];
            if data.is_empty() {
                continue;
            }
            dimension_header(&mut out, dim);

            let mut means: Vec<(ChunkPos, f64)> = data
                .iter()
                .filter(|(_, samples)| !samples.is_empty())
                .map(|(pos, samples)| {
                    let sum: u64 = samples.iter().sum();
                    (*pos, micros_to_ms(sum) / samples.len() as f64)
                })
                .collect();
            let shown = top_by(&mut means, self.top_n, |a, b| b.1.total_cmp(&a.1));

            for (pos, mean) in shown {
                let (x, z) = pos.center_block();
                out.plain(" - ")
                    .highlight(format!("[{x} {z}]   "))
                    .plain(format!("{mean:.3} ms\n"));
            }
        }
        out
    }

    /// MSPT / TPS and MIN / MAX lines over the latency window.
    pub fn latency_summary(&self, recorder: &LatencyRecorder) -> StyledText {
        let mspt = recorder.mean_ms();
        let mut out = StyledText::new();
        out.plain(" - MSPT / TPS: ")
            .highlight(format!("{:.3} / {:.1}\n", mspt, self.tps(mspt)))
            .plain(" - MIN / MAX: ")
            .highlight(format!(
                "{:.3} / {:.3}\n",
                micros_to_ms(recorder.min()),
                micros_to_ms(recorder.max())
            ));
        out
    }

    /// Steps per second at `mspt`, capped at the target. An empty window
    /// (mspt 0) reports the target.
    pub fn tps(&self, mspt: f64) -> f64 {
        if mspt <= 0.0 {
            return self.target_tps;
        }
        (1000.0 / mspt).min(self.target_tps)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::from_config(&ProfilerConfig::default())
    }
}

fn dimension_header(out: &mut StyledText, dim: Dimension) {
    out.emphasis(format!("-- {} --\n", dim.label()));
}

fn entity(e: &EntityData, rounds: u32) -> StyledText {
    let mut out = StyledText::new();
    let rounds_f = f64::from(rounds);
    for dim in Dimension::ALL {
        let data = &e.per_dimension[dim.index()];
        if data.is_empty() {
            continue;
        }
        dimension_header(&mut out, dim);

        let mut rows: Vec<_> = data.iter().collect();
        rows.sort_by(|a, b| b.1.time_us.cmp(&a.1.time_us));
        for (name, stats) in rows {
            out.plain(" - ")
                .highlight(format!("{name}   "))
                .plain(format!(
                    "{:.3} ms ({})\n",
                    micros_to_ms(stats.time_us) / rounds_f,
                    stats.count / u64::from(rounds)
                ));
        }
    }
    out
}

/// The `n` greatest items under `cmp`, in order. Selects before sorting so
/// only the kept prefix is ordered.
fn top_by<T, F>(items: &mut Vec<T>, n: usize, mut cmp: F) -> &[T]
where
    F: FnMut(&T, &T) -> Ordering,
{
    let n = n.min(items.len());
    if n == 0 {
        return &[];
    }
    if n < items.len() {
        items.select_nth_unstable_by(n - 1, &mut cmp);
    }
    let head = &mut items[..n];
    head.sort_by(cmp);
    head
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::{ActorStats, ChunkSamples, PendingTickData};
    use smallvec::smallvec;

    fn snapshot(rounds: u32, data: Accumulators) -> SessionSnapshot {
        SessionSnapshot { rounds, data }
    }

    #[test]
    fn basics_mspt_and_capped_tps() {
        let mut b = BasicsData::default();
        b.server_level = 20_000 + 22_000 + 18_000 + 25_000 + 19_000;
        let text = ReportGenerator::default()
            .render(&snapshot(5, Accumulators::Basics(b)))
            .unwrap()
            .to_string();
        assert!(
            text.starts_with("- MSPT: 20.800 ms TPS: 20 Chunks: 0\n"),
            "{text}"
        );
        assert!(text.contains("\n  - Signal: 0.000 ms\n"));
        assert!(text.ends_with("  - PendingTick: 0.000 ms\n"));
    }

    #[test]
    fn basics_tps_floors_when_over_budget() {
        let mut b = BasicsData::default();
        b.server_level = 2 * 80_000;
        b.redstone.signal = 2 * 1_500;
        b.redstone.pending_remove = 2 * 500;
        let text = ReportGenerator::default()
            .render(&snapshot(2, Accumulators::Basics(b)))
            .unwrap()
            .to_string();
        assert!(text.starts_with("- MSPT: 80.000 ms TPS: 12 "), "{text}");
        assert!(text.contains("- Redstone: 2.000 ms\n"));
        assert!(text.contains("  - Remove: 0.500 ms\n"));
    }

    #[test]
    fn zero_rounds_render_nothing() {
        let r = ReportGenerator::default();
        assert!(r.render(&snapshot(0, Accumulators::default())).is_none());
    }

    #[test]
    fn pending_tick_has_no_report() {
        let r = ReportGenerator::default();
        let snap = snapshot(
            4,
            Accumulators::PendingTick(PendingTickData { total_us: 900 }),
        );
        assert!(r.render(&snap).is_none());
    }

    #[test]
    fn chunk_report_lists_top_five_descending() {
        let mut c = ChunkData::default();
        let means_ms = [1.0, 5.0, 3.0, 2.0, 4.5, 0.5];
        for (i, ms) in means_ms.iter().enumerate() {
            let us = (ms * 1000.0) as u64;
            let samples: ChunkSamples = smallvec![us, us];
            c.per_dimension[0].insert(ChunkPos::new(i as i32, 0), samples);
        }
        let text = ReportGenerator::default()
            .render(&snapshot(2, Accumulators::Chunk(c)))
            .unwrap()
            .to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "-- Overworld --");
        assert_eq!(
            &lines[1..],
            &[
                " - [24 8]   5.000 ms",
                " - [72 8]   4.500 ms",
                " - [40 8]   3.000 ms",
                " - [56 8]   2.000 ms",
                " - [8 8]   1.000 ms",
            ]
        );
    }

    #[test]
    fn chunk_report_skips_empty_dimensions() {
        let mut c = ChunkData::default();
        c.per_dimension[2].insert(ChunkPos::new(-1, 1), smallvec![3000]);
        let text = ReportGenerator::default()
            .render(&snapshot(1, Accumulators::Chunk(c)))
            .unwrap()
            .to_string();
        assert_eq!(text, "-- The end --\n - [-8 24]   3.000 ms\n");
    }

    #[test]
    fn entity_report_sorted_by_time() {
        let mut e = EntityData::default();
        e.per_dimension[1].insert(
            "skeleton".to_string(),
            ActorStats {
                time_us: 4_000,
                count: 9,
            },
        );
        e.per_dimension[1].insert(
            "blaze".to_string(),
            ActorStats {
                time_us: 12_000,
                count: 4,
            },
        );
        let text = ReportGenerator::default()
            .render(&snapshot(4, Accumulators::Entity(e)))
            .unwrap()
            .to_string();
        assert_eq!(
            text,
            "-- Nether --\n - blaze   3.000 ms (1)\n - skeleton   1.000 ms (2)\n"
        );
    }

    #[test]
    fn entity_header_is_emphasised() {
        let mut e = EntityData::default();
        e.per_dimension[0].insert("cow".to_string(), ActorStats::default());
        let text = ReportGenerator::default()
            .render(&snapshot(1, Accumulators::Entity(e)))
            .unwrap();
        let first = &text.segments()[0];
        assert_eq!(first.style, cadence_core::Style::Emphasis);
        assert_eq!(first.text, "-- Overworld --\n");
    }

    #[test]
    fn latency_summary_format() {
        let mut rec = LatencyRecorder::default();
        for us in [20_000, 22_000, 18_000, 25_000, 19_000] {
            rec.push(us);
        }
        let text = ReportGenerator::default().latency_summary(&rec).to_string();
        assert_eq!(
            text,
            " - MSPT / TPS: 20.800 / 20.0\n - MIN / MAX: 18.000 / 25.000\n"
        );
    }

    #[test]
    fn summary_tps_below_target() {
        let r = ReportGenerator::default();
        assert_eq!(r.tps(80.0), 12.5);
        assert_eq!(r.tps(0.0), 20.0);
    }

    #[test]
    fn top_by_handles_short_input() {
        let mut v = vec![3, 1, 2];
        assert_eq!(top_by(&mut v, 5, |a, b| b.cmp(a)), &[3, 2, 1]);
        let mut empty: Vec<i32> = Vec::new();
        assert!(top_by(&mut empty, 5, |a, b| b.cmp(a)).is_empty());
    }
}
