//! Seed and persisted catalogue documents for the POI tracker.
//!
//! This crate owns the on-disk formats of the tracker's catalogue and knows
//! nothing about geofencing. It is kept independent of the tracker's domain
//! types so the tracker can depend on it without cycles.
//!
//! # Overview
//!
//! The crate supports:
//!
//! - Parsing the versioned seed document listing regions and raw POIs
//! - Loading and saving the expanded POI list as a JSON array
//! - Atomic whole-file replacement on save
//!
//! # Example
//!
//! ```
//! use catalog_data::SeedCatalog;
//!
//! let json = r#"{
//!     "version": 1,
//!     "regions": [
//!         {"name": "Geneva", "lat": 46.2, "long": 6.15, "areaKm2": 16},
//!         {"name": "Lausanne", "lat": 46.519833, "long": 6.6335, "areaKm2": 42}
//!     ],
//!     "pois": [
//!         {"name": "Geosatis", "lat": 46.517494, "long": 6.562019, "category": "Business"}
//!     ]
//! }"#;
//!
//! let seed = SeedCatalog::from_json(json).expect("valid seed");
//! assert_eq!(seed.regions()[1].name, "Lausanne");
//! ```

mod atomic_io;
mod error;
mod persisted;
mod seed;

pub use error::CatalogDataError;
pub use persisted::{PersistedCatalogFile, PoiRecord, RegionRecord};
pub use seed::{SeedCatalog, SeedPoi, SeedRegion};
