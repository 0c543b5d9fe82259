//! Domain-level error taxonomy for the tracker.
//!
//! Computation-layer operations (geometry, catalog expansion and zone-set
//! building) return these errors to their caller. The transition handler is
//! the terminal boundary: it logs them and reports a
//! [`TransitionOutcome`](super::TransitionOutcome) instead of propagating.

use std::fmt;

use thiserror::Error;

use super::zones::{TransitionKind, ZoneLabel};

/// Which half of an exclusive install was rejected by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallPhase {
    /// Deregistering the previously active set.
    Remove,
    /// Registering the new set.
    Add,
}

impl fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Remove => "remove",
            Self::Add => "add",
        })
    }
}

/// Failures raised by the tracker domain.
///
/// # Examples
/// ```
/// use poi_tracker::domain::TrackerError;
///
/// let err = TrackerError::invalid_input("area must be positive");
/// assert_eq!(err.to_string(), "invalid input: area must be positive");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// A coordinate, area or other argument is out of range.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the rejected value.
        message: String,
    },
    /// There are no regions, so points of interest cannot be owned.
    #[error("catalog contains no regions")]
    EmptyCatalog,
    /// No zone qualified for the requested tier.
    #[error("no zones qualify for {scope}")]
    EmptyResultSet {
        /// Human-readable description of what was being built.
        scope: String,
    },
    /// The monitor rejected one half of an exclusive install.
    #[error("zone install failed during {phase}: {message}")]
    ZoneInstallFailed {
        /// Half of the install that failed.
        phase: InstallPhase,
        /// Monitor-supplied failure description.
        message: String,
    },
    /// A zone identifier could not be parsed back into label and owner.
    #[error("malformed zone identifier '{zone_id}'")]
    MalformedEventId {
        /// Raw identifier as delivered by the monitor.
        zone_id: String,
    },
    /// The zone owner does not exist in the catalog.
    #[error("no {label} with id {owner_id} in the catalog")]
    UnresolvedOwner {
        /// Namespace the owner was looked up in.
        label: ZoneLabel,
        /// Owner identifier that failed to resolve.
        owner_id: u32,
    },
    /// The event does not apply to the current tier.
    #[error("{transition} on {zone_id} is inconsistent with tier {tier}")]
    AnomalousTransition {
        /// Zone identifier of the event.
        zone_id: String,
        /// Transition kind of the event.
        transition: TransitionKind,
        /// Tier at the time the event arrived.
        tier: String,
    },
    /// The catalog could not be loaded or rebuilt.
    #[error("catalog unavailable: {message}")]
    CatalogUnavailable {
        /// Description of the storage failure.
        message: String,
    },
}

impl TrackerError {
    /// Convenience constructor for [`TrackerError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`TrackerError::EmptyResultSet`].
    pub fn empty_result_set(scope: impl Into<String>) -> Self {
        Self::EmptyResultSet {
            scope: scope.into(),
        }
    }

    /// Convenience constructor for [`TrackerError::MalformedEventId`].
    pub fn malformed_event_id(zone_id: impl Into<String>) -> Self {
        Self::MalformedEventId {
            zone_id: zone_id.into(),
        }
    }

    /// Convenience constructor for [`TrackerError::CatalogUnavailable`].
    pub fn catalog_unavailable(message: impl Into<String>) -> Self {
        Self::CatalogUnavailable {
            message: message.into(),
        }
    }
}
