//! Result of feeding one event or install through the handler.

use crate::domain::TrackerError;

/// What the handler did with an event.
///
/// The handler never fails: every path ends in one of these outcomes and
/// the tracker stays in a well-defined tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The event was acted upon and any required install succeeded.
    Applied,
    /// The event was dropped and the tier is unchanged.
    Ignored(TrackerError),
    /// The monitor refused to retire the active set, so the tier was
    /// restored to match the set that is still registered.
    RolledBack(TrackerError),
    /// Every install attempt failed and no zones are registered.
    Degraded(TrackerError),
    /// The monitor delivered an error code instead of transitions.
    MonitorError {
        /// Platform error code.
        code: i32,
        /// Readable description of the code.
        message: &'static str,
    },
}

impl TransitionOutcome {
    /// Whether the event took effect without any failure.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}
