//! Monitoring zones and the builder that derives them from the catalog.
//!
//! A zone is never authored by hand: it is derived from a region or an
//! expanded POI for the active tier. Its identifier `"{LABEL}_{ownerId}"`
//! round-trips through the external monitor and back into the handler.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::TrackerError;
use super::catalog::{Catalog, ExpandedPoi, Region};
use super::geo::{Coordinate, distance_meters};
use super::tier::TierState;

/// Namespace of a zone owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneLabel {
    /// Owner is a region id.
    Region,
    /// Owner is an expanded POI id.
    Poi,
}

impl ZoneLabel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Region => "REGION",
            Self::Poi => "POI",
        }
    }
}

impl fmt::Display for ZoneLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transition reported by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransitionKind {
    /// The device entered the zone.
    Enter,
    /// The device left the zone.
    Exit,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enter => "ENTER",
            Self::Exit => "EXIT",
        })
    }
}

/// Transitions a zone asks the monitor to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionMask {
    /// Both entering and leaving.
    EnterExit,
    /// Leaving only.
    ExitOnly,
}

impl TransitionMask {
    /// Whether the mask asks for `kind`.
    #[must_use]
    pub const fn reports(self, kind: TransitionKind) -> bool {
        matches!(
            (self, kind),
            (Self::EnterExit, _) | (Self::ExitOnly, TransitionKind::Exit)
        )
    }
}

/// Parsed zone identifier.
///
/// # Examples
/// ```
/// use poi_tracker::domain::{ZoneId, ZoneLabel};
///
/// let id: ZoneId = "REGION_2".parse()?;
/// assert_eq!(id.label(), ZoneLabel::Region);
/// assert_eq!(id.owner_id(), 2);
/// assert_eq!(id.to_string(), "REGION_2");
/// assert!("CITY_5".parse::<ZoneId>().is_err());
/// # Ok::<(), poi_tracker::domain::TrackerError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoneId {
    label: ZoneLabel,
    owner_id: u32,
}

impl ZoneId {
    /// Identifier for a region zone.
    #[must_use]
    pub const fn region(owner_id: u32) -> Self {
        Self {
            label: ZoneLabel::Region,
            owner_id,
        }
    }

    /// Identifier for a POI zone.
    #[must_use]
    pub const fn poi(owner_id: u32) -> Self {
        Self {
            label: ZoneLabel::Poi,
            owner_id,
        }
    }

    /// Owner namespace.
    #[must_use]
    pub const fn label(self) -> ZoneLabel {
        self.label
    }

    /// Owner identifier within its namespace.
    #[must_use]
    pub const fn owner_id(self) -> u32 {
        self.owner_id
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.label, self.owner_id)
    }
}

impl FromStr for ZoneId {
    type Err = TrackerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || TrackerError::malformed_event_id(raw);
        let mut fields = raw.split('_');
        let (Some(label), Some(owner), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(malformed());
        };
        let label = match label {
            "REGION" => ZoneLabel::Region,
            "POI" => ZoneLabel::Poi,
            _ => return Err(malformed()),
        };
        if owner.is_empty() || !owner.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let owner_id = owner
            .parse::<u32>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(malformed)?;
        Ok(Self { label, owner_id })
    }
}

/// A circular zone registered with the external monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    id: ZoneId,
    center: Coordinate,
    radius_meters: f64,
    responsiveness: Duration,
    transition_mask: TransitionMask,
    initial_trigger: Option<TransitionKind>,
    expires_after: Option<Duration>,
}

impl Zone {
    fn new(
        id: ZoneId,
        center: Coordinate,
        radius_meters: f64,
        responsiveness: Duration,
        transition_mask: TransitionMask,
    ) -> Self {
        Self {
            id,
            center,
            radius_meters,
            responsiveness,
            transition_mask,
            initial_trigger: Some(TransitionKind::Enter),
            expires_after: None,
        }
    }

    /// Parsed identifier.
    #[must_use]
    pub const fn id(&self) -> ZoneId {
        self.id
    }

    /// Circle centre.
    #[must_use]
    pub const fn center(&self) -> Coordinate {
        self.center
    }

    /// Circle radius in metres.
    #[must_use]
    pub const fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    /// Delay the monitor may take before reporting a transition.
    #[must_use]
    pub const fn responsiveness(&self) -> Duration {
        self.responsiveness
    }

    /// Responsiveness in whole milliseconds.
    #[must_use]
    pub const fn notification_responsiveness_ms(&self) -> u128 {
        self.responsiveness.as_millis()
    }

    /// Transitions this zone reports.
    #[must_use]
    pub const fn transition_mask(&self) -> TransitionMask {
        self.transition_mask
    }

    /// Transition evaluated immediately on registration.
    #[must_use]
    pub const fn initial_trigger(&self) -> Option<TransitionKind> {
        self.initial_trigger
    }

    /// Expiry; `None` means the zone never expires.
    #[must_use]
    pub const fn expires_after(&self) -> Option<Duration> {
        self.expires_after
    }
}

/// Ordered zones installed together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonitoringSet {
    zones: Vec<Zone>,
}

impl MonitoringSet {
    /// Zones in installation order.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Zone identifiers in installation order.
    #[must_use]
    pub fn zone_ids(&self) -> Vec<ZoneId> {
        self.zones.iter().map(Zone::id).collect()
    }

    /// Look up a zone by identifier.
    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the set holds no zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// Tunables for zone derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSettings {
    /// Fixed radius of POI zones, in metres.
    pub poi_radius_meters: f64,
    /// Widening applied when classifying a point as inside a region.
    pub region_margin_factor: f64,
    /// Travel speed used to throttle distant region zones, in km/h.
    pub max_speed_kmh: f64,
    /// Responsiveness used for POI zones and when no location is known.
    pub default_responsiveness: Duration,
    /// Lower bound for distance-derived responsiveness.
    pub min_responsiveness: Duration,
    /// Upper bound for distance-derived responsiveness.
    pub max_responsiveness: Duration,
    /// Platform ceiling on concurrently monitored zones.
    pub max_zones: usize,
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self {
            poi_radius_meters: 200.0,
            region_margin_factor: 1.1,
            max_speed_kmh: 100.0,
            default_responsiveness: Duration::from_secs(5 * 60),
            min_responsiveness: Duration::from_secs(12),
            max_responsiveness: Duration::from_secs(60 * 60),
            max_zones: 100,
        }
    }
}

/// Derives the monitoring set for a tier.
///
/// # Examples
/// ```
/// use poi_tracker::domain::{
///     Catalog, Coordinate, Region, TierState, ZoneSetBuilder, ZoneSettings,
/// };
///
/// let lausanne = Region::new(2, "Lausanne", Coordinate::new(46.519_833, 6.6335)?, 42)?;
/// let catalog = Catalog::new(vec![lausanne], Vec::new())?;
/// let builder = ZoneSetBuilder::new(ZoneSettings::default());
///
/// let set = builder.build(&TierState::OutsideAllRegions, &catalog, None)?;
/// assert_eq!(set.zone_ids()[0].to_string(), "REGION_2");
/// # Ok::<(), poi_tracker::domain::TrackerError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ZoneSetBuilder {
    settings: ZoneSettings,
}

impl ZoneSetBuilder {
    /// Create a builder with `settings`.
    #[must_use]
    pub const fn new(settings: ZoneSettings) -> Self {
        Self { settings }
    }

    /// Active settings.
    #[must_use]
    pub const fn settings(&self) -> &ZoneSettings {
        &self.settings
    }

    /// Build the set for `tier`.
    ///
    /// Outside all regions this is the region tier. Inside a region it is
    /// the region's POI tier followed by one exit-only zone for the region,
    /// trimmed so the whole set respects the zone ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::EmptyResultSet`] when no zone qualifies.
    pub fn build(
        &self,
        tier: &TierState,
        catalog: &Catalog,
        reference: Option<Coordinate>,
    ) -> Result<MonitoringSet, TrackerError> {
        match tier {
            TierState::OutsideAllRegions => self.region_tier(catalog, reference),
            TierState::InsideRegion(region) => {
                let mut set = self.poi_tier(catalog, region.name(), reference)?;
                set.zones.truncate(self.settings.max_zones.saturating_sub(1));
                set.zones.push(self.region_exit_zone(region));
                Ok(set)
            }
        }
    }

    /// One zone per region, nearest first when `location` is known.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::EmptyResultSet`] when the catalog has no
    /// regions or the zone ceiling leaves no room for one.
    pub fn region_tier(
        &self,
        catalog: &Catalog,
        location: Option<Coordinate>,
    ) -> Result<MonitoringSet, TrackerError> {
        let ranked = self.cap(rank(catalog.regions().iter(), location, Region::center));
        if ranked.is_empty() {
            return Err(TrackerError::empty_result_set("the region tier"));
        }

        let zones = ranked
            .into_iter()
            .map(|(region, distance)| {
                let responsiveness = distance.map_or(self.settings.default_responsiveness, |d| {
                    self.throttled_responsiveness(d)
                });
                Zone::new(
                    ZoneId::region(region.id()),
                    region.center(),
                    region.radius_meters(),
                    responsiveness,
                    TransitionMask::EnterExit,
                )
            })
            .collect();
        Ok(MonitoringSet { zones })
    }

    /// One zone per POI owned by `region_name`, nearest first when
    /// `reference` is known.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::EmptyResultSet`] when the region owns no POI
    /// or the zone ceiling leaves no room for one.
    pub fn poi_tier(
        &self,
        catalog: &Catalog,
        region_name: &str,
        reference: Option<Coordinate>,
    ) -> Result<MonitoringSet, TrackerError> {
        let ranked = self.cap(rank(
            catalog.pois_in_region(region_name),
            reference,
            |poi: &ExpandedPoi| poi.location,
        ));
        if ranked.is_empty() {
            return Err(TrackerError::empty_result_set(format!(
                "region {region_name}"
            )));
        }

        let zones = ranked
            .into_iter()
            .map(|(poi, _)| {
                Zone::new(
                    ZoneId::poi(poi.id),
                    poi.location,
                    self.settings.poi_radius_meters,
                    self.settings.default_responsiveness,
                    TransitionMask::EnterExit,
                )
            })
            .collect();
        Ok(MonitoringSet { zones })
    }

    /// Exit-only zone covering `region`, installed alongside its POIs.
    #[must_use]
    pub fn region_exit_zone(&self, region: &Region) -> Zone {
        Zone::new(
            ZoneId::region(region.id()),
            region.center(),
            region.radius_meters(),
            self.settings.default_responsiveness,
            TransitionMask::ExitOnly,
        )
    }

    /// Set holding only `region`'s exit zone.
    #[must_use]
    pub fn region_exit_set(&self, region: &Region) -> MonitoringSet {
        MonitoringSet {
            zones: vec![self.region_exit_zone(region)],
        }
    }

    fn cap<T>(&self, mut ranked: Vec<T>) -> Vec<T> {
        if ranked.len() > self.settings.max_zones {
            ranked.truncate(self.settings.max_zones.saturating_sub(1));
        }
        ranked
    }

    fn throttled_responsiveness(&self, distance_meters: f64) -> Duration {
        let meters_per_second = self.settings.max_speed_kmh * 1_000.0 / 3_600.0;
        let min = self.settings.min_responsiveness;
        let max = self.settings.max_responsiveness.max(min);
        Duration::try_from_secs_f64(distance_meters / meters_per_second)
            .map_or(max, |delay| delay.clamp(min, max))
    }
}

/// Pair each item with its distance from `reference` and sort ascending.
/// Without a reference the input order is kept.
fn rank<'a, T: 'a>(
    items: impl Iterator<Item = &'a T>,
    reference: Option<Coordinate>,
    position: impl Fn(&T) -> Coordinate,
) -> Vec<(&'a T, Option<f64>)> {
    let mut ranked = items
        .map(|item| (item, reference.map(|r| distance_meters(r, position(item)))))
        .collect::<Vec<_>>();
    if reference.is_some() {
        ranked.sort_by(|a, b| {
            a.1.unwrap_or_default()
                .total_cmp(&b.1.unwrap_or_default())
        });
    }
    ranked
}

#[cfg(test)]
mod tests;
