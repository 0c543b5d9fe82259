//! Seed catalogue types and JSON parsing.
//!
//! The seed catalogue is the static, install-time list of regions and raw
//! points of interest. It carries no derived data: region identifiers,
//! owning regions and distances are computed by the tracker when it expands
//! the catalogue on first launch.

use camino::Utf8Path;
use serde::Deserialize;

use crate::atomic_io::read_document;
use crate::error::CatalogDataError;

/// Current supported seed document version.
const SUPPORTED_VERSION: u32 = 1;

/// A parsed seed catalogue.
///
/// # Example
///
/// ```
/// use catalog_data::SeedCatalog;
///
/// let json = r#"{
///     "version": 1,
///     "regions": [{"name": "Geneva", "lat": 46.2, "long": 6.15, "areaKm2": 16}],
///     "pois": [{"name": "Planete Charmilles", "lat": 46.208333, "long": 6.124292, "category": "Mall"}]
/// }"#;
///
/// let seed = SeedCatalog::from_json(json).expect("valid seed");
/// assert_eq!(seed.regions().len(), 1);
/// assert_eq!(seed.pois()[0].category, "Mall");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SeedCatalog {
    version: u32,
    regions: Vec<SeedRegion>,
    pois: Vec<SeedPoi>,
}

impl SeedCatalog {
    /// Parses a seed catalogue from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDataError`] if:
    /// - The JSON is malformed or misses required fields
    /// - The version is unsupported
    /// - The regions array is empty
    pub fn from_json(json: &str) -> Result<Self, CatalogDataError> {
        let raw: RawSeedCatalog =
            serde_json::from_str(json).map_err(|e| CatalogDataError::ParseError {
                message: e.to_string(),
            })?;

        if raw.version != SUPPORTED_VERSION {
            return Err(CatalogDataError::UnsupportedVersion {
                expected: SUPPORTED_VERSION,
                actual: raw.version,
            });
        }

        if raw.regions.is_empty() {
            return Err(CatalogDataError::EmptyRegions);
        }

        Ok(Self {
            version: raw.version,
            regions: raw.regions,
            pois: raw.pois,
        })
    }

    /// Loads a seed catalogue from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDataError::NotFound`] when the file is missing and
    /// other [`CatalogDataError`] variants if it cannot be read or parsed.
    pub fn from_file(path: &Utf8Path) -> Result<Self, CatalogDataError> {
        let contents = read_document(path)?;
        Self::from_json(&contents)
    }

    /// Returns the document version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns the regions in document order.
    #[must_use]
    pub fn regions(&self) -> &[SeedRegion] {
        &self.regions
    }

    /// Returns the raw points of interest in document order.
    #[must_use]
    pub fn pois(&self) -> &[SeedPoi] {
        &self.pois
    }
}

/// A region (city) as listed in the seed document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRegion {
    /// Human-readable region name.
    pub name: String,
    /// Centroid latitude in degrees.
    pub lat: f64,
    /// Centroid longitude in degrees.
    pub long: f64,
    /// Surface area in square kilometres.
    pub area_km2: u32,
}

/// A raw point of interest as listed in the seed document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedPoi {
    /// POI name, assumed unique across the catalogue.
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub long: f64,
    /// Free-text category.
    pub category: String,
}

/// Raw JSON representation for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSeedCatalog {
    version: u32,
    regions: Vec<SeedRegion>,
    #[serde(default)]
    pois: Vec<SeedPoi>,
}
