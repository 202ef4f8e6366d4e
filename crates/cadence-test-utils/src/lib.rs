//! Test utilities and doubles for Cadence development.
//!
//! Provides a hand-driven [`ManualClock`], a [`RecordingBroadcaster`] that
//! keeps everything it is asked to send, and scripted tick sources in
//! [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cadence_core::{Audience, Broadcaster, Clock, StyledText};

pub mod fixtures;

pub use fixtures::ScriptedTickSource;

/// A [`Clock`] that only moves when told to.
///
/// Clones share the same time, so a tick source can advance the clock the
/// driver reads.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(us: u64) -> Self {
        let c = Self::new();
        c.set(us);
        c
    }

    /// Move time forward by `us` microseconds.
    pub fn advance(&self, us: u64) {
        self.now.fetch_add(us, Ordering::AcqRel);
    }

    pub fn set(&self, us: u64) {
        self.now.store(us, Ordering::Release);
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}

/// Keeps every broadcast for later inspection.
#[derive(Clone, Debug, Default)]
pub struct RecordingBroadcaster {
    messages: Vec<(StyledText, Audience)>,
}

impl RecordingBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[(StyledText, Audience)] {
        &self.messages
    }

    /// Plain-text rendering of every message, oldest first.
    pub fn texts(&self) -> Vec<String> {
        self.messages.iter().map(|(m, _)| m.to_string()).collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.messages.last().map(|(m, _)| m.to_string())
    }

    /// Whether any message's plain text contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages
            .iter()
            .any(|(m, _)| m.to_string().contains(needle))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn broadcast(&mut self, message: &StyledText, audience: Audience) {
        self.messages.push((message.clone(), audience));
    }
}
