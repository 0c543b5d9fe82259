//! File-backed catalog storage using `catalog-data`.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use catalog_data::{
    CatalogDataError, PersistedCatalogFile, PoiRecord, RegionRecord, SeedCatalog,
};

use crate::domain::ports::{CatalogRepository, CatalogRepositoryError, CatalogSeed};
use crate::domain::{Coordinate, ExpandedPoi, Poi, Region, TrackerError};

/// Reads the seed document and stores the expanded list as JSON files.
#[derive(Debug, Clone)]
pub struct FileCatalogRepository {
    seed_path: Utf8PathBuf,
    expanded: PersistedCatalogFile,
}

impl FileCatalogRepository {
    /// Create a repository over the given seed and expanded-list paths.
    pub fn new(seed_path: impl Into<Utf8PathBuf>, expanded_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            seed_path: seed_path.into(),
            expanded: PersistedCatalogFile::new(expanded_path),
        }
    }

    /// Seed document path.
    #[must_use]
    pub fn seed_path(&self) -> &Utf8Path {
        &self.seed_path
    }

    /// Expanded-list path.
    #[must_use]
    pub fn expanded_path(&self) -> &Utf8Path {
        self.expanded.path()
    }
}

#[async_trait]
impl CatalogRepository for FileCatalogRepository {
    async fn load_seed(&self) -> Result<CatalogSeed, CatalogRepositoryError> {
        let seed = SeedCatalog::from_file(&self.seed_path).map_err(map_data_error)?;
        let regions = seed
            .regions()
            .iter()
            .zip(1_u32..)
            .map(|(region, id)| {
                let center = Coordinate::new(region.lat, region.long)?;
                Region::new(id, region.name.clone(), center, region.area_km2)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_domain_error)?;
        let pois = seed
            .pois()
            .iter()
            .map(|poi| {
                Ok(Poi {
                    name: poi.name.clone(),
                    location: Coordinate::new(poi.lat, poi.long)?,
                    category: poi.category.clone(),
                })
            })
            .collect::<Result<Vec<_>, TrackerError>>()
            .map_err(map_domain_error)?;
        Ok(CatalogSeed { regions, pois })
    }

    async fn load_expanded(&self) -> Result<Vec<ExpandedPoi>, CatalogRepositoryError> {
        let records = self.expanded.load().map_err(map_data_error)?;
        records
            .into_iter()
            .map(expanded_from_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_domain_error)
    }

    async fn save_expanded(&self, pois: &[ExpandedPoi]) -> Result<(), CatalogRepositoryError> {
        let records = pois.iter().map(record_from_expanded).collect::<Vec<_>>();
        self.expanded.save(&records).map_err(map_data_error)
    }
}

fn expanded_from_record(record: PoiRecord) -> Result<ExpandedPoi, TrackerError> {
    let RegionRecord {
        id,
        name,
        lat,
        long,
        area_km2,
    } = record.region;
    let region = Region::new(id, name, Coordinate::new(lat, long)?, area_km2)?;
    Ok(ExpandedPoi {
        id: record.id,
        name: record.name,
        location: Coordinate::new(record.lat, record.long)?,
        category: record.category,
        region,
        distance_from_region: record.distance_from_region,
    })
}

fn record_from_expanded(poi: &ExpandedPoi) -> PoiRecord {
    PoiRecord {
        id: poi.id,
        name: poi.name.clone(),
        lat: poi.location.latitude(),
        long: poi.location.longitude(),
        category: poi.category.clone(),
        region: RegionRecord {
            id: poi.region.id(),
            name: poi.region.name().to_owned(),
            lat: poi.region.center().latitude(),
            long: poi.region.center().longitude(),
            area_km2: poi.region.area_km2(),
        },
        distance_from_region: poi.distance_from_region,
    }
}

fn map_data_error(error: CatalogDataError) -> CatalogRepositoryError {
    match error {
        CatalogDataError::NotFound { path } => CatalogRepositoryError::not_found(path.to_string()),
        CatalogDataError::IoError { .. } | CatalogDataError::WriteError { .. } => {
            CatalogRepositoryError::io(error.to_string())
        }
        CatalogDataError::ParseError { .. }
        | CatalogDataError::UnsupportedVersion { .. }
        | CatalogDataError::EmptyRegions => CatalogRepositoryError::corrupt(error.to_string()),
    }
}

fn map_domain_error(error: TrackerError) -> CatalogRepositoryError {
    CatalogRepositoryError::corrupt(error.to_string())
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::expect_used,
        reason = "test code uses expect for clear failure messages"
    )]

    use rstest::{fixture, rstest};

    use super::*;
    use crate::test_support::cap_fs::{path_exists, write_file};
    use crate::test_support::catalogs::seeded_catalog;
    use crate::test_support::workspace::CatalogWorkspace;

    #[fixture]
    fn workspace() -> CatalogWorkspace {
        CatalogWorkspace::with_default_seed()
    }

    fn repository(workspace: &CatalogWorkspace) -> FileCatalogRepository {
        FileCatalogRepository::new(workspace.seed_path(), workspace.expanded_path())
    }

    #[rstest]
    #[tokio::test]
    async fn seed_regions_are_numbered_in_document_order(workspace: CatalogWorkspace) {
        let seed = repository(&workspace).load_seed().await.expect("seed");

        let names = seed
            .regions
            .iter()
            .map(|region| (region.id(), region.name().to_owned()))
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            [(1, "Geneva".to_owned()), (2, "Lausanne".to_owned())]
        );
        assert_eq!(seed.pois.len(), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_expanded_list_is_not_found(workspace: CatalogWorkspace) {
        let err = repository(&workspace)
            .load_expanded()
            .await
            .expect_err("nothing saved yet");

        assert!(matches!(err, CatalogRepositoryError::NotFound { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn saved_list_reloads_with_identical_values(workspace: CatalogWorkspace) {
        let repository = repository(&workspace);
        let catalog = seeded_catalog();

        repository
            .save_expanded(catalog.pois())
            .await
            .expect("save");
        let reloaded = repository.load_expanded().await.expect("load");

        assert!(path_exists(workspace.expanded_path().as_std_path()));
        assert_eq!(reloaded, catalog.pois());
    }

    #[rstest]
    #[case::garbage("not json")]
    #[case::bad_coordinate(
        r#"[{"id": 1, "name": "X", "lat": 123.0, "long": 6.0, "category": "C",
            "region": {"id": 1, "name": "Geneva", "lat": 46.2, "long": 6.15, "areaKm2": 16},
            "distanceFromRegion": 1.0}]"#
    )]
    #[tokio::test]
    async fn unreadable_lists_are_corrupt(workspace: CatalogWorkspace, #[case] contents: &str) {
        write_file(workspace.expanded_path().as_std_path(), contents.as_bytes())
            .expect("write fixture");

        let err = repository(&workspace)
            .load_expanded()
            .await
            .expect_err("corrupt");

        assert!(matches!(err, CatalogRepositoryError::Corrupt { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_seed_is_not_found(workspace: CatalogWorkspace) {
        let repository = FileCatalogRepository::new(
            workspace.path().join("absent.json"),
            workspace.expanded_path(),
        );

        let err = repository.load_seed().await.expect_err("no seed");

        assert!(matches!(err, CatalogRepositoryError::NotFound { .. }));
    }
}
