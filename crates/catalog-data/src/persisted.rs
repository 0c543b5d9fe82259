//! Persisted expanded-POI records.
//!
//! The tracker expands the seed catalogue once and stores the result as a
//! JSON array of [`PoiRecord`] values. Saves overwrite the whole list; there
//! are no incremental updates.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::atomic_io::{open_parent_dir, read_document, write_atomic};
use crate::error::CatalogDataError;

/// Region embedded by value inside a persisted POI record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionRecord {
    /// Catalogue-assigned region identifier.
    pub id: u32,
    /// Region name.
    pub name: String,
    /// Centroid latitude.
    pub lat: f64,
    /// Centroid longitude.
    pub long: f64,
    /// Surface area in square kilometres.
    pub area_km2: u32,
}

/// One expanded POI as stored on disk.
///
/// # Example
///
/// ```
/// use catalog_data::{PoiRecord, RegionRecord};
///
/// let json = r#"{
///     "id": 3,
///     "name": "Geosatis",
///     "lat": 46.517494,
///     "long": 6.562019,
///     "category": "Business",
///     "region": {"id": 2, "name": "Lausanne", "lat": 46.519833, "long": 6.6335, "areaKm2": 42},
///     "distanceFromRegion": 5418.2
/// }"#;
///
/// let record: PoiRecord = serde_json::from_str(json).expect("valid record");
/// assert_eq!(record.region.name, "Lausanne");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiRecord {
    /// Catalogue-assigned POI identifier, unique within the list.
    pub id: u32,
    /// POI name.
    pub name: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub long: f64,
    /// Free-text category.
    pub category: String,
    /// Owning region, nearest by distance at expansion time.
    pub region: RegionRecord,
    /// Distance in metres between the POI and its region centroid.
    pub distance_from_region: f64,
}

/// Reads and writes the persisted POI list at a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCatalogFile {
    path: Utf8PathBuf,
}

impl PersistedCatalogFile {
    /// Create a handle for the catalogue stored at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Load every record in stored order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDataError::NotFound`] when nothing has been saved
    /// yet, [`CatalogDataError::IoError`] when the file is unreadable and
    /// [`CatalogDataError::ParseError`] when its contents are corrupt.
    pub fn load(&self) -> Result<Vec<PoiRecord>, CatalogDataError> {
        let contents = read_document(&self.path)?;
        serde_json::from_str(&contents).map_err(|e| CatalogDataError::ParseError {
            message: e.to_string(),
        })
    }

    /// Replace the stored list with `records`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDataError::WriteError`] when the list cannot be
    /// serialised or written.
    pub fn save(&self, records: &[PoiRecord]) -> Result<(), CatalogDataError> {
        let contents =
            serde_json::to_string_pretty(records).map_err(|e| CatalogDataError::WriteError {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        let (dir, file_name) =
            open_parent_dir(&self.path).map_err(|e| CatalogDataError::WriteError {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        write_atomic(&dir, Utf8Path::new(file_name), &contents)
    }
}
