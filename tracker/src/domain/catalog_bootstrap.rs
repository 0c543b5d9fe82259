//! Build-once loading of the catalog.
//!
//! The expanded POI list is computed on first launch and persisted. Later
//! launches reload it instead of recomputing, so POI identifiers stay
//! stable across runs even if the expansion rules change.

use tracing::{info, warn};

use super::TrackerError;
use super::catalog::{Catalog, build_expanded_list};
use super::ports::{CatalogRepository, CatalogRepositoryError, CatalogSeed};

/// Loads the catalog through a [`CatalogRepository`].
pub struct CatalogBootstrap;

impl CatalogBootstrap {
    /// Load the persisted catalog, building and saving it when it is
    /// missing or unreadable.
    ///
    /// A failed save is logged and the freshly built catalog is still
    /// returned; the next launch simply rebuilds it.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::CatalogUnavailable`] when the seed or the
    /// persisted list cannot be read, and propagates catalog validation
    /// errors for the seed itself.
    pub async fn open(repository: &dyn CatalogRepository) -> Result<Catalog, TrackerError> {
        let CatalogSeed { regions, pois } = repository
            .load_seed()
            .await
            .map_err(|err| TrackerError::catalog_unavailable(err.to_string()))?;

        match repository.load_expanded().await {
            Ok(expanded) => match Catalog::new(regions.clone(), expanded) {
                Ok(catalog) => {
                    info!(
                        regions = catalog.regions().len(),
                        pois = catalog.pois().len(),
                        "loaded persisted catalog"
                    );
                    return Ok(catalog);
                }
                Err(err) => warn!(error = %err, "persisted catalog failed validation; rebuilding"),
            },
            Err(CatalogRepositoryError::NotFound { .. }) => {
                info!("no persisted catalog; building from seed");
            }
            Err(err @ CatalogRepositoryError::Corrupt { .. }) => {
                warn!(error = %err, "persisted catalog is corrupt; rebuilding");
            }
            Err(err) => return Err(TrackerError::catalog_unavailable(err.to_string())),
        }

        let expanded = build_expanded_list(&pois, &regions)?;
        if let Err(err) = repository.save_expanded(&expanded).await {
            warn!(error = %err, "failed to persist expanded catalog");
        }
        let catalog = Catalog::new(regions, expanded)?;
        info!(
            regions = catalog.regions().len(),
            pois = catalog.pois().len(),
            "built catalog from seed"
        );
        Ok(catalog)
    }
}
