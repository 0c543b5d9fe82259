//! Immutable region and point-of-interest catalog.
//!
//! Regions come from the seed document and keep their 1-based seed order as
//! identity. Raw POIs are expanded once: each is bound to its nearest region
//! and numbered in build order. The expanded list is then persisted and
//! reloaded rather than recomputed.

use std::collections::HashSet;

use super::TrackerError;
use super::geo::{Coordinate, containment_radius, distance_meters, is_within};

/// Upper bound on regions so region notification ids (`10 + id`) stay below
/// the POI notification range starting at 1000.
pub const MAX_REGIONS: usize = 990;

/// A city-sized area approximated by a circle around its centroid.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    id: u32,
    name: String,
    center: Coordinate,
    area_km2: u32,
    radius_meters: f64,
}

impl Region {
    /// Build a region, deriving its containment radius from the area.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidInput`] for a zero id or zero area.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        center: Coordinate,
        area_km2: u32,
    ) -> Result<Self, TrackerError> {
        if id == 0 {
            return Err(TrackerError::invalid_input("region ids start at 1"));
        }
        let radius_meters = containment_radius(area_km2)?;
        Ok(Self {
            id,
            name: name.into(),
            center,
            area_km2,
            radius_meters,
        })
    }

    /// Catalog identifier, 1-based in seed order.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Region name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Centroid.
    #[must_use]
    pub const fn center(&self) -> Coordinate {
        self.center
    }

    /// Surface area in square kilometres.
    #[must_use]
    pub const fn area_km2(&self) -> u32 {
        self.area_km2
    }

    /// Radius of the circle with the region's area, in metres.
    #[must_use]
    pub const fn radius_meters(&self) -> f64 {
        self.radius_meters
    }
}

/// A raw point of interest as listed in the seed.
#[derive(Debug, Clone, PartialEq)]
pub struct Poi {
    /// Name, assumed unique across the catalog.
    pub name: String,
    /// Position.
    pub location: Coordinate,
    /// Free-text category.
    pub category: String,
}

/// A point of interest bound to its owning region.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedPoi {
    /// Catalog identifier, 1-based in build order and stable afterwards.
    pub id: u32,
    /// Name.
    pub name: String,
    /// Position.
    pub location: Coordinate,
    /// Free-text category.
    pub category: String,
    /// Nearest region at build time, held by value.
    pub region: Region,
    /// Distance to the owning region's centroid, in metres.
    pub distance_from_region: f64,
}

/// Bind every raw POI to its nearest region.
///
/// Regions are scanned in list order and the first one at the minimum
/// distance wins, which keeps results compatible with lists persisted by
/// earlier builds.
///
/// # Errors
///
/// Returns [`TrackerError::EmptyCatalog`] when `regions` is empty.
pub fn build_expanded_list(
    raw_pois: &[Poi],
    regions: &[Region],
) -> Result<Vec<ExpandedPoi>, TrackerError> {
    if regions.is_empty() {
        return Err(TrackerError::EmptyCatalog);
    }

    let mut expanded = Vec::with_capacity(raw_pois.len());
    for (poi, id) in raw_pois.iter().zip(1_u32..) {
        let (region, distance) = nearest_region(poi.location, regions)?;
        expanded.push(ExpandedPoi {
            id,
            name: poi.name.clone(),
            location: poi.location,
            category: poi.category.clone(),
            region: region.clone(),
            distance_from_region: distance,
        });
    }
    Ok(expanded)
}

fn nearest_region(point: Coordinate, regions: &[Region]) -> Result<(&Region, f64), TrackerError> {
    let mut best: Option<(&Region, f64)> = None;
    for region in regions {
        let distance = distance_meters(point, region.center);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((region, distance)),
        }
    }
    best.ok_or(TrackerError::EmptyCatalog)
}

/// The expanded, read-only catalog shared by the tracker.
///
/// # Examples
/// ```
/// use poi_tracker::domain::{Catalog, Coordinate, Poi, Region};
///
/// let geneva = Region::new(1, "Geneva", Coordinate::new(46.2, 6.15)?, 16)?;
/// let lausanne = Region::new(2, "Lausanne", Coordinate::new(46.519_833, 6.6335)?, 42)?;
/// let geosatis = Poi {
///     name: "Geosatis".to_owned(),
///     location: Coordinate::new(46.517_494, 6.562_019)?,
///     category: "Business".to_owned(),
/// };
///
/// let catalog = Catalog::build(vec![geneva, lausanne], &[geosatis])?;
/// assert_eq!(catalog.poi(1).map(|poi| poi.region.name()), Some("Lausanne"));
/// # Ok::<(), poi_tracker::domain::TrackerError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    regions: Vec<Region>,
    pois: Vec<ExpandedPoi>,
}

impl Catalog {
    /// Assemble a catalog from regions and an already expanded POI list.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::EmptyCatalog`] without regions and
    /// [`TrackerError::InvalidInput`] when there are more than
    /// [`MAX_REGIONS`] regions, identifiers repeat or are zero, or a POI
    /// names an owning region the catalog does not hold.
    pub fn new(regions: Vec<Region>, pois: Vec<ExpandedPoi>) -> Result<Self, TrackerError> {
        if regions.is_empty() {
            return Err(TrackerError::EmptyCatalog);
        }
        if regions.len() > MAX_REGIONS {
            return Err(TrackerError::invalid_input(format!(
                "{} regions exceed the limit of {MAX_REGIONS}",
                regions.len()
            )));
        }
        ensure_unique_ids("region", regions.iter().map(Region::id))?;
        ensure_unique_ids("poi", pois.iter().map(|poi| poi.id))?;
        ensure_known_owners(&regions, &pois)?;
        Ok(Self { regions, pois })
    }

    /// Expand `raw_pois` against `regions` and assemble the catalog.
    ///
    /// # Errors
    ///
    /// Propagates failures from [`build_expanded_list`] and [`Catalog::new`].
    pub fn build(regions: Vec<Region>, raw_pois: &[Poi]) -> Result<Self, TrackerError> {
        let pois = build_expanded_list(raw_pois, &regions)?;
        Self::new(regions, pois)
    }

    /// Regions in seed order.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Expanded POIs in build order.
    #[must_use]
    pub fn pois(&self) -> &[ExpandedPoi] {
        &self.pois
    }

    /// Look up a region by id.
    #[must_use]
    pub fn region(&self, id: u32) -> Option<&Region> {
        self.regions.iter().find(|region| region.id == id)
    }

    /// Look up an expanded POI by id.
    #[must_use]
    pub fn poi(&self, id: u32) -> Option<&ExpandedPoi> {
        self.pois.iter().find(|poi| poi.id == id)
    }

    /// POIs owned by the region called `name`, in build order.
    pub fn pois_in_region<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ExpandedPoi> {
        self.pois.iter().filter(move |poi| poi.region.name == name)
    }

    /// First region whose margin-widened circle contains `point`.
    #[must_use]
    pub fn containing_region(&self, point: Coordinate, margin_factor: f64) -> Option<&Region> {
        self.regions
            .iter()
            .find(|region| is_within(point, region.center, region.radius_meters, margin_factor))
    }
}

fn ensure_unique_ids(kind: &str, ids: impl Iterator<Item = u32>) -> Result<(), TrackerError> {
    let mut seen = HashSet::new();
    for id in ids {
        if id == 0 || !seen.insert(id) {
            return Err(TrackerError::invalid_input(format!(
                "{kind} id {id} is zero or repeated"
            )));
        }
    }
    Ok(())
}

fn ensure_known_owners(regions: &[Region], pois: &[ExpandedPoi]) -> Result<(), TrackerError> {
    let orphan = pois.iter().find(|poi| {
        !regions
            .iter()
            .any(|region| region.id == poi.region.id && region.name == poi.region.name)
    });
    match orphan {
        Some(poi) => Err(TrackerError::invalid_input(format!(
            "poi {} is owned by unknown region {} ({})",
            poi.id, poi.region.id, poi.region.name
        ))),
        None => Ok(()),
    }
}
