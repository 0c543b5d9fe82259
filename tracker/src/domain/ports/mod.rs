//! Driven ports and their payload types.

mod macros;
pub(crate) use macros::define_port_error;

mod catalog_repository;
mod location_provider;
mod notifier;
mod zone_monitor;

#[cfg(test)]
pub use catalog_repository::MockCatalogRepository;
pub use catalog_repository::{CatalogRepository, CatalogRepositoryError, CatalogSeed};
#[cfg(test)]
pub use location_provider::MockLocationProvider;
pub use location_provider::{FixtureLocationProvider, LocationProvider, LocationProviderError};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{
    Notification, NotificationChannel, Notifier, NotifierError, POI_NOTIFICATION_BASE,
    REGION_NOTIFICATION_BASE,
};
#[cfg(test)]
pub use zone_monitor::MockZoneMonitor;
pub use zone_monitor::{MonitorHandle, ZoneMonitor, ZoneMonitorError};
