//! Proximity tier of the tracker.

use std::fmt;

use super::catalog::Region;

/// Which granularity of zones is active.
///
/// Only the transition handler moves between tiers.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TierState {
    /// Region zones are monitored while travelling between regions.
    #[default]
    OutsideAllRegions,
    /// POI zones of this region, plus its exit zone, are monitored.
    InsideRegion(Region),
}

impl TierState {
    /// Region the user is currently inside, if any.
    #[must_use]
    pub const fn region(&self) -> Option<&Region> {
        match self {
            Self::OutsideAllRegions => None,
            Self::InsideRegion(region) => Some(region),
        }
    }
}

impl fmt::Display for TierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutsideAllRegions => f.write_str("OUTSIDE_ALL_REGIONS"),
            Self::InsideRegion(region) => write!(f, "INSIDE_REGION({})", region.name()),
        }
    }
}
