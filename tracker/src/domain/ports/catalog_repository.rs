//! Driven port for the seed catalog and the persisted expanded POI list.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::catalog::{ExpandedPoi, Poi, Region};

/// Static catalog shipped with the application.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSeed {
    /// Regions with ids assigned in seed order.
    pub regions: Vec<Region>,
    /// Raw POIs in seed order.
    pub pois: Vec<Poi>,
}

define_port_error! {
    /// Errors raised by catalog storage.
    pub enum CatalogRepositoryError {
        /// Nothing has been stored yet.
        NotFound { message: String } =>
            "catalog not found: {message}",
        /// Stored data cannot be decoded or fails validation.
        Corrupt { message: String } =>
            "catalog data is corrupt: {message}",
        /// Storage could not be read or written.
        Io { message: String } =>
            "catalog storage failed: {message}",
    }
}

/// Port for loading the seed and loading or replacing the expanded list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Load the static seed catalog.
    async fn load_seed(&self) -> Result<CatalogSeed, CatalogRepositoryError>;

    /// Load the persisted expanded list in stored order.
    async fn load_expanded(&self) -> Result<Vec<ExpandedPoi>, CatalogRepositoryError>;

    /// Replace the persisted expanded list.
    async fn save_expanded(&self, pois: &[ExpandedPoi]) -> Result<(), CatalogRepositoryError>;
}
