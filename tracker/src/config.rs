//! Tracker configuration loaded via OrthoConfig.
//!
//! Unset values fall back to the defaults of [`ZoneSettings`] and
//! [`HandlerSettings`].

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{HandlerSettings, ZoneSettings};

fn default_seed_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("catalog")
        .join("seed.json")
}

fn default_expanded_path() -> PathBuf {
    PathBuf::from("expanded_pois.json")
}

/// Configuration values for catalog storage, zone derivation and event
/// processing.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "POI_TRACKER")]
pub struct TrackerSettings {
    /// Seed catalog document.
    pub seed_path: Option<PathBuf>,
    /// Where the expanded POI list is persisted.
    pub expanded_path: Option<PathBuf>,
    /// Radius of POI zones, in metres.
    pub poi_radius_meters: Option<f64>,
    /// Widening applied when deciding whether a point lies in a region.
    pub region_margin_factor: Option<f64>,
    /// Travel speed used to throttle distant region zones, in km/h.
    pub max_speed_kmh: Option<f64>,
    /// Platform ceiling on concurrently monitored zones.
    pub max_zones: Option<usize>,
    /// Default zone responsiveness, in seconds.
    pub responsiveness_secs: Option<u64>,
    /// Install attempts per transition before the tracker degrades.
    pub install_attempts: Option<u32>,
    /// Capacity of the event queue in front of the handler.
    #[ortho_config(default = 64)]
    pub queue_capacity: usize,
}

impl TrackerSettings {
    /// Return the configured seed path, falling back to the bundled seed.
    pub fn seed_path(&self) -> PathBuf {
        self.seed_path.clone().unwrap_or_else(default_seed_path)
    }

    /// Return the configured expanded-list path, falling back to the
    /// working directory.
    pub fn expanded_path(&self) -> PathBuf {
        self.expanded_path
            .clone()
            .unwrap_or_else(default_expanded_path)
    }

    /// Zone derivation settings with overrides applied.
    pub fn zone_settings(&self) -> ZoneSettings {
        let defaults = ZoneSettings::default();
        ZoneSettings {
            poi_radius_meters: self.poi_radius_meters.unwrap_or(defaults.poi_radius_meters),
            region_margin_factor: self
                .region_margin_factor
                .unwrap_or(defaults.region_margin_factor),
            max_speed_kmh: self.max_speed_kmh.unwrap_or(defaults.max_speed_kmh),
            default_responsiveness: self
                .responsiveness_secs
                .map_or(defaults.default_responsiveness, Duration::from_secs),
            max_zones: self.max_zones.unwrap_or(defaults.max_zones),
            ..defaults
        }
    }

    /// Handler settings with overrides applied.
    pub fn handler_settings(&self) -> HandlerSettings {
        let defaults = HandlerSettings::default();
        HandlerSettings {
            install_attempts: self.install_attempts.unwrap_or(defaults.install_attempts),
        }
    }

    /// Event queue capacity, never zero.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.max(1)
    }
}
