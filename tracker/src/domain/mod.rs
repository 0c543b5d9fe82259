//! Domain primitives, the zone-set builder and the tier state machine.
//!
//! Purpose: keep every rule about regions, points of interest and monitored
//! zones independent of how events arrive or where the catalog is stored.
//! Adapters talk to this layer only through the traits in [`ports`].
//!
//! Public surface:
//! - Coordinate, `distance_meters`, `containment_radius`, `is_within`:
//!   geodesic helpers.
//! - Catalog, Region, Poi, ExpandedPoi: the read-only catalog.
//! - ZoneSetBuilder, MonitoringSet, Zone, ZoneId: zone derivation.
//! - ZoneManager: exclusive installs against the monitor.
//! - TransitionHandler, TrackerService: event processing.
//! - CatalogBootstrap: build-once catalog loading.
//! - TrackerError: error taxonomy.

pub mod ports;

mod catalog;
mod catalog_bootstrap;
mod diagnostics;
mod error;
mod geo;
mod monitor_events;
mod tier;
mod tracker_service;
mod transition_handler;
mod zone_manager;
mod zones;

pub use self::catalog::{Catalog, ExpandedPoi, MAX_REGIONS, Poi, Region, build_expanded_list};
pub use self::catalog_bootstrap::CatalogBootstrap;
pub use self::diagnostics::{DiagnosticsSnapshot, FailureRecord, TrackerDiagnostics};
pub use self::error::{InstallPhase, TrackerError};
pub use self::geo::{Coordinate, containment_radius, distance_meters, is_within};
pub use self::monitor_events::{
    GEOFENCE_NOT_AVAILABLE, GEOFENCE_TOO_MANY_GEOFENCES, GEOFENCE_TOO_MANY_PENDING_INTENTS,
    MonitorBatch, monitor_error_message,
};
pub use self::tier::TierState;
pub use self::tracker_service::{TrackerHandle, TrackerService, TrackerServiceClosed};
pub use self::transition_handler::{
    HandlerSettings, TrackerSnapshot, TransitionHandler, TransitionHandlerPorts,
    TransitionOutcome,
};
pub use self::zone_manager::{ActiveSet, ZoneInstallError, ZoneManager};
pub use self::zones::{
    MonitoringSet, TransitionKind, TransitionMask, Zone, ZoneId, ZoneLabel, ZoneSetBuilder,
    ZoneSettings,
};
