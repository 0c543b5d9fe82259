//! Driven port for the device's last known position.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::geo::Coordinate;

define_port_error! {
    /// Errors raised while querying the location service.
    pub enum LocationProviderError {
        /// Location permission has not been granted.
        PermissionDenied => "location permission denied",
        /// The location service failed.
        Unavailable { message: String } =>
            "location service unavailable: {message}",
    }
}

/// Port for the last known device location.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Last fix, or `None` when the device has never reported one.
    async fn last_known_location(&self) -> Result<Option<Coordinate>, LocationProviderError>;
}

/// Fixture provider for tests that never know a location.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureLocationProvider;

#[async_trait]
impl LocationProvider for FixtureLocationProvider {
    async fn last_known_location(&self) -> Result<Option<Coordinate>, LocationProviderError> {
        Ok(None)
    }
}
