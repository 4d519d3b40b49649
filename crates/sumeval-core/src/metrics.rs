//! Process-wide counters for generation, scoring and rating.
//!
//! Values are emitted together by [`Metrics::flush`], normally once when a
//! run or command finishes.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

pub static METRICS: Metrics = Metrics::new();

/// The things SUMEVAL counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    GenerationCalls,
    GenerationFailures,
    RecordsScored,
    RatingsRejected,
}

impl Counter {
    pub const ALL: [Counter; 4] = [
        Self::GenerationCalls,
        Self::GenerationFailures,
        Self::RecordsScored,
        Self::RatingsRejected,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::GenerationCalls => "generation_calls",
            Self::GenerationFailures => "generation_failures",
            Self::RecordsScored => "records_scored",
            Self::RatingsRejected => "ratings_rejected",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Copy of every counter at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub generation_calls: u64,
    pub generation_failures: u64,
    pub records_scored: u64,
    pub ratings_rejected: u64,
}

pub struct Metrics {
    counters: [AtomicU64; 4],
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            counters: [
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
                AtomicU64::new(0),
            ],
        }
    }

    pub fn inc(&self, counter: Counter) {
        self.add(counter, 1);
    }

    pub fn add(&self, counter: Counter, n: u64) {
        self.counters[counter.slot()].fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = counter.name(), n, "counter incremented");
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.counters[counter.slot()].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            generation_calls: self.get(Counter::GenerationCalls),
            generation_failures: self.get(Counter::GenerationFailures),
            records_scored: self.get(Counter::RecordsScored),
            ratings_rejected: self.get(Counter::RatingsRejected),
        }
    }

    /// Log the current snapshot as one `metrics.flush` event.
    pub fn flush(&self) {
        let snap = self.snapshot();
        tracing::info!(
            event = "metrics.flush",
            generation_calls = snap.generation_calls,
            generation_failures = snap.generation_failures,
            records_scored = snap.records_scored,
            ratings_rejected = snap.ratings_rejected,
        );
    }

    pub fn reset(&self) {
        for counter in Counter::ALL {
            self.counters[counter.slot()].store(0, Ordering::Relaxed);
        }
    }
}
