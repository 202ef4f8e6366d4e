//! Rolling window of recent step durations.
//!
//! [`LatencyRecorder`] keeps the last N durations (microseconds) and derives
//! mean/min/max by scanning. The window is small (20 by default), so a scan
//! is cheaper than maintaining any index structure.

use std::collections::VecDeque;

/// Bounded FIFO of step durations in microseconds.
#[derive(Clone, Debug)]
pub struct LatencyRecorder {
    samples: VecDeque<u64>,
    capacity: usize,
}

impl LatencyRecorder {
    /// Default window length.
    pub const DEFAULT_WINDOW: usize = 20;

    /// An empty recorder holding at most `capacity` samples.
    ///
    /// A zero capacity is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest if the window is full.
    pub fn push(&mut self, sample_us: u64) {
        self.samples.push_back(sample_us);
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Truncating integer mean, or 0 when empty.
    pub fn mean(&self) -> u64 {
        if self.samples.is_empty() {
            return 0;
        }
        let sum: u64 = self.samples.iter().sum();
        sum / self.samples.len() as u64
    }

    /// Smallest sample, or 0 when empty.
    pub fn min(&self) -> u64 {
        self.samples.iter().copied().min().unwrap_or(0)
    }

    /// Largest sample, or 0 when empty.
    pub fn max(&self) -> u64 {
        self.samples.iter().copied().max().unwrap_or(0)
    }

    /// [`mean`](Self::mean) in milliseconds.
    pub fn mean_ms(&self) -> f64 {
        micros_to_ms(self.mean())
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample has been pushed since creation or the last clear.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Window length.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples from oldest to newest.
    pub fn samples(&self) -> impl Iterator<Item = u64> + '_ {
        self.samples.iter().copied()
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for LatencyRecorder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

/// Convert microseconds to milliseconds.
pub fn micros_to_ms(us: u64) -> f64 {
    us as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_window_is_all_zero() {
        let r = LatencyRecorder::default();
        assert!(r.is_empty());
        assert_eq!(r.mean(), 0);
        assert_eq!(r.min(), 0);
        assert_eq!(r.max(), 0);
        assert_eq!(r.mean_ms(), 0.0);
    }

    #[test]
    fn keeps_last_twenty_of_twenty_five() {
        let mut r = LatencyRecorder::default();
        for v in 1..=25u64 {
            r.push(v * 1000);
        }
        assert_eq!(r.len(), 20);
        let kept: Vec<u64> = r.samples().collect();
        assert_eq!(kept.first(), Some(&6000));
        assert_eq!(kept.last(), Some(&25000));
        assert_eq!(r.min(), 6000);
        assert_eq!(r.max(), 25000);
        // (6 + ... + 25) * 1000 / 20 = 15500
        assert_eq!(r.mean(), 15500);
    }

    #[test]
    fn mean_truncates() {
        let mut r = LatencyRecorder::new(3);
        r.push(1);
        r.push(2);
        assert_eq!(r.mean(), 1);
    }

    #[test]
    fn zero_capacity_holds_one() {
        let mut r = LatencyRecorder::new(0);
        r.push(5);
        r.push(9);
        assert_eq!(r.capacity(), 1);
        assert_eq!(r.samples().collect::<Vec<_>>(), vec![9]);
    }

    #[test]
    fn clear_empties_window() {
        let mut r = LatencyRecorder::default();
        r.push(10);
        r.clear();
        assert!(r.is_empty());
        assert_eq!(r.max(), 0);
    }

    proptest! {
        #[test]
        fn window_reflects_only_recent_samples(
            cap in 1usize..40,
            values in proptest::collection::vec(0u64..1_000_000, 0..100),
        ) {
            let mut r = LatencyRecorder::new(cap);
            for &v in &values {
                r.push(v);
            }
            let start = values.len().saturating_sub(cap);
            let tail = &values[start..];
            prop_assert_eq!(r.len(), tail.len());
            prop_assert_eq!(r.min(), tail.iter().copied().min().unwrap_or(0));
            prop_assert_eq!(r.max(), tail.iter().copied().max().unwrap_or(0));
            let expected_mean = if tail.is_empty() {
                0
            } else {
                tail.iter().sum::<u64>() / tail.len() as u64
            };
            prop_assert_eq!(r.mean(), expected_mean);
        }
    }
}
