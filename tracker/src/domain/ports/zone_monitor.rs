//! Driven port for the platform's circular-zone monitoring service.

use std::fmt;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::zones::MonitoringSet;

/// Opaque handle for one registration of a monitoring set.
///
/// Each install attempt receives a fresh generation, so a handle always
/// names exactly one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonitorHandle {
    generation: u64,
}

impl MonitorHandle {
    /// Handle for the given install generation.
    #[must_use]
    pub const fn new(generation: u64) -> Self {
        Self { generation }
    }

    /// Install generation this handle was issued for.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

impl fmt::Display for MonitorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "generation-{}", self.generation)
    }
}

define_port_error! {
    /// Errors reported by the zone monitor.
    pub enum ZoneMonitorError {
        /// The monitor refused the request, for example over its zone limit.
        Rejected { message: String } =>
            "zone monitor rejected the request: {message}",
        /// The monitor could not be reached.
        Unavailable { message: String } =>
            "zone monitor unavailable: {message}",
    }
}

/// Port for registering and retiring zone sets.
///
/// Implementations report completion only once the platform acknowledges
/// the call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ZoneMonitor: Send + Sync {
    /// Register every zone of `set` under `handle`.
    async fn register_zones(
        &self,
        handle: MonitorHandle,
        set: &MonitoringSet,
    ) -> Result<(), ZoneMonitorError>;

    /// Retire every zone registered under `handle`.
    async fn deregister_zones(&self, handle: MonitorHandle) -> Result<(), ZoneMonitorError>;
}
