//! Batches of transitions as delivered by the external monitor.

use serde::{Deserialize, Serialize};

use super::zones::TransitionKind;

/// Monitor error code: the location service is off or unavailable.
pub const GEOFENCE_NOT_AVAILABLE: i32 = 1000;
/// Monitor error code: too many zones registered by this application.
pub const GEOFENCE_TOO_MANY_GEOFENCES: i32 = 1001;
/// Monitor error code: too many pending registrations.
pub const GEOFENCE_TOO_MANY_PENDING_INTENTS: i32 = 1002;

/// One delivery from the monitor: every zone that fired together with one
/// transition kind, or an error code instead.
///
/// # Examples
/// ```
/// use poi_tracker::domain::{MonitorBatch, TransitionKind};
///
/// let batch: MonitorBatch =
///     serde_json::from_str(r#"{"zoneIds": ["REGION_2"], "transition": "ENTER"}"#)?;
/// assert_eq!(batch.transition, TransitionKind::Enter);
/// assert_eq!(batch.error_code, None);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorBatch {
    /// Raw identifiers of the zones that fired, in delivery order.
    #[serde(default)]
    pub zone_ids: Vec<String>,
    /// Transition shared by every zone in the batch.
    pub transition: TransitionKind,
    /// Monitor error code; when present the batch carries no usable events.
    #[serde(default)]
    pub error_code: Option<i32>,
}

impl MonitorBatch {
    /// A batch of `zone_ids` that all reported `transition`.
    pub fn new<I, S>(transition: TransitionKind, zone_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            zone_ids: zone_ids.into_iter().map(Into::into).collect(),
            transition,
            error_code: None,
        }
    }
}

/// Readable message for a monitor error code.
#[must_use]
pub const fn monitor_error_message(code: i32) -> &'static str {
    match code {
        GEOFENCE_NOT_AVAILABLE => "Geofence not available",
        GEOFENCE_TOO_MANY_GEOFENCES => "Too many geofences",
        GEOFENCE_TOO_MANY_PENDING_INTENTS => "Too many pending intents",
        _ => "Unknown geofence error",
    }
}
