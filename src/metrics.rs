//! Counter side-channel for service operations.
//!
//! The service bumps named counters as it works. Increments are
//! fire-and-forget: they never fail and never block the primary operation.
//! Any backend satisfies the contract; the in-process [`CounterRecorder`]
//! is enough for the CLI and for test observation.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Counter bumped on every accepted publish.
pub const METRIC_PUBLISHED_TWEETS: &str = "published-tweets";

/// Counter bumped on every discard attempt, even for a missing id.
pub const METRIC_DISCARDED_TWEETS: &str = "discarded-tweets";

/// Counter bumped on every published-tweets listing.
pub const METRIC_TIMES_QUERIED_PUBLISHED_TWEETS: &str = "times-queried-published-tweets";

/// Counter bumped on every discarded-tweets listing.
pub const METRIC_TIMES_QUERIED_DISCARDED_TWEETS: &str = "times-queried-discarded-tweets";

/// Capability to count occurrences of named events.
pub trait MetricsRecorder: Send + Sync {
    /// Add `delta` to the counter `name`. Must not fail or block.
    fn increment(&self, name: &str, delta: i64);
}

/// In-memory counter map.
#[derive(Debug, Default)]
pub struct CounterRecorder {
    counters: RwLock<HashMap<String, i64>>,
}

impl CounterRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle, for handing one recorder to a service while keeping
    /// a reader.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Current value of a counter, zero if never incremented.
    #[must_use]
    pub fn get(&self, name: &str) -> i64 {
        self.counters.read().get(name).copied().unwrap_or(0)
    }

    /// Snapshot of all counters, sorted by name.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, i64)> {
        let mut entries: Vec<(String, i64)> = self
            .counters
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl MetricsRecorder for CounterRecorder {
    fn increment(&self, name: &str, delta: i64) {
        let mut counters = self.counters.write();
        *counters.entry(name.to_string()).or_insert(0) += delta;
    }
}

/// Recorder that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecorder;

impl MetricsRecorder for NullRecorder {
    fn increment(&self, _name: &str, _delta: i64) {}
}
