//! Counters and failure records that make degraded operation observable.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;

/// The most recent failure the tracker recovered from or gave up on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    /// Rendered error.
    pub message: String,
    /// When it was recorded.
    pub at: DateTime<Utc>,
}

/// Point-in-time copy of the diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiagnosticsSnapshot {
    /// Events that were applied or attempted.
    pub events_processed: u64,
    /// Events dropped as malformed, unresolved or anomalous.
    pub events_ignored: u64,
    /// Batches dropped because the monitor reported an error code.
    pub batches_dropped: u64,
    /// Generation of the last successful install.
    pub last_generation: Option<u64>,
    /// Most recent failure.
    pub last_failure: Option<FailureRecord>,
    /// Whether no monitoring set is installed after a failed install.
    pub degraded: bool,
    /// Region containing the last known location at bootstrap.
    pub bootstrap_region: Option<String>,
}

/// Mutable diagnostics owned by the transition handler.
pub struct TrackerDiagnostics {
    clock: Arc<dyn Clock>,
    current: DiagnosticsSnapshot,
}

impl TrackerDiagnostics {
    /// Start with zeroed counters.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            current: DiagnosticsSnapshot::default(),
        }
    }

    pub(crate) const fn record_processed(&mut self) {
        self.current.events_processed += 1;
    }

    pub(crate) const fn record_ignored(&mut self) {
        self.current.events_ignored += 1;
    }

    pub(crate) const fn record_dropped_batch(&mut self) {
        self.current.batches_dropped += 1;
    }

    pub(crate) const fn record_install(&mut self, generation: u64) {
        self.current.last_generation = Some(generation);
        self.current.degraded = false;
    }

    pub(crate) fn record_failure(&mut self, message: impl Into<String>) {
        self.current.last_failure = Some(FailureRecord {
            message: message.into(),
            at: self.clock.utc(),
        });
    }

    pub(crate) const fn mark_degraded(&mut self) {
        self.current.degraded = true;
    }

    pub(crate) fn record_bootstrap_region(&mut self, region: Option<String>) {
        self.current.bootstrap_region = region;
    }

    /// Whether the tracker is currently degraded.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.current.degraded
    }

    /// Copy the current values.
    #[must_use]
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        self.current.clone()
    }
}
