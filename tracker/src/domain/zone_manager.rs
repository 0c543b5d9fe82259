//! Owner of the installed monitoring set.
//!
//! Installs are exclusive: the active registration is retired and
//! acknowledged before the replacement is registered, because overlapping
//! sets can silently exceed the platform's zone ceiling.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use super::TrackerError;
use super::error::InstallPhase;
use super::ports::{MonitorHandle, ZoneMonitor, ZoneMonitorError};
use super::zones::MonitoringSet;

/// A failed exclusive install.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{phase} half of the install failed: {source}")]
pub struct ZoneInstallError {
    /// Half that failed.
    pub phase: InstallPhase,
    /// Monitor failure.
    #[source]
    pub source: ZoneMonitorError,
}

impl From<ZoneInstallError> for TrackerError {
    fn from(err: ZoneInstallError) -> Self {
        Self::ZoneInstallFailed {
            phase: err.phase,
            message: err.source.to_string(),
        }
    }
}

/// The registered set and the handle it was registered under.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSet {
    /// Registration handle.
    pub handle: MonitorHandle,
    /// Registered zones.
    pub set: MonitoringSet,
}

/// Serializes installs against one zone monitor.
///
/// `install_exclusive` takes `&mut self`, so two installs can never
/// interleave on the same manager.
pub struct ZoneManager {
    monitor: Arc<dyn ZoneMonitor>,
    active: Option<ActiveSet>,
    next_generation: u64,
}

impl ZoneManager {
    /// Create a manager with nothing installed.
    pub fn new(monitor: Arc<dyn ZoneMonitor>) -> Self {
        Self {
            monitor,
            active: None,
            next_generation: 1,
        }
    }

    /// Currently registered set, if any.
    #[must_use]
    pub const fn active(&self) -> Option<&ActiveSet> {
        self.active.as_ref()
    }

    /// Generation of the most recently issued handle, if any.
    #[must_use]
    pub const fn last_generation(&self) -> Option<u64> {
        match self.next_generation {
            1 => None,
            next => Some(next - 1),
        }
    }

    /// Replace the active set with `set`.
    ///
    /// On a remove failure nothing changes and the previous set stays
    /// active. On an add failure the previous set is already gone and no
    /// set is active until a later install succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneInstallError`] naming the half that failed.
    pub async fn install_exclusive(
        &mut self,
        set: MonitoringSet,
    ) -> Result<MonitorHandle, ZoneInstallError> {
        if let Some(previous) = self.active.as_ref().map(|active| active.handle) {
            self.monitor
                .deregister_zones(previous)
                .await
                .map_err(|source| ZoneInstallError {
                    phase: InstallPhase::Remove,
                    source,
                })?;
            debug!(handle = %previous, "retired previous monitoring set");
            self.active = None;
        }

        let handle = MonitorHandle::new(self.next_generation);
        self.next_generation += 1;
        self.monitor
            .register_zones(handle, &set)
            .await
            .map_err(|source| ZoneInstallError {
                phase: InstallPhase::Add,
                source,
            })?;

        info!(
            generation = handle.generation(),
            zones = set.len(),
            "installed monitoring set"
        );
        self.active = Some(ActiveSet { handle, set });
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::expect_used,
        reason = "test code uses expect for clear failure messages"
    )]

    use mockall::Sequence;
    use mockall::predicate::eq;

    use super::*;
    use crate::domain::ports::MockZoneMonitor;
    use crate::domain::{Catalog, Coordinate, Region, ZoneSetBuilder};

    fn region_set() -> MonitoringSet {
        let center = Coordinate::new(46.519_833, 6.6335).expect("coordinate");
        let region = Region::new(2, "Lausanne", center, 42).expect("region");
        let catalog = Catalog::new(vec![region], Vec::new()).expect("catalog");
        ZoneSetBuilder::default()
            .region_tier(&catalog, None)
            .expect("set")
    }

    #[tokio::test]
    async fn first_install_only_registers() {
        let mut monitor = MockZoneMonitor::new();
        monitor.expect_deregister_zones().never();
        monitor
            .expect_register_zones()
            .withf(|handle, _| handle.generation() == 1)
            .times(1)
            .returning(|_, _| Ok(()));
        let mut manager = ZoneManager::new(Arc::new(monitor));

        let handle = manager
            .install_exclusive(region_set())
            .await
            .expect("install");

        assert_eq!(handle, MonitorHandle::new(1));
        assert_eq!(manager.active().map(|a| a.handle), Some(handle));
    }

    #[tokio::test]
    async fn replacement_removes_before_adding() {
        let mut seq = Sequence::new();
        let mut monitor = MockZoneMonitor::new();
        monitor
            .expect_register_zones()
            .withf(|handle, _| handle.generation() == 1)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        monitor
            .expect_deregister_zones()
            .with(eq(MonitorHandle::new(1)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        monitor
            .expect_register_zones()
            .withf(|handle, _| handle.generation() == 2)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        let mut manager = ZoneManager::new(Arc::new(monitor));

        manager.install_exclusive(region_set()).await.expect("first");
        let second = manager
            .install_exclusive(region_set())
            .await
            .expect("second");

        assert_eq!(second.generation(), 2);
        assert_eq!(manager.last_generation(), Some(2));
        assert_eq!(manager.active().map(|a| a.handle), Some(second));
    }

    #[tokio::test]
    async fn remove_failure_keeps_previous_set_active() {
        let mut monitor = MockZoneMonitor::new();
        monitor
            .expect_register_zones()
            .times(1)
            .returning(|_, _| Ok(()));
        monitor
            .expect_deregister_zones()
            .times(1)
            .returning(|_| Err(ZoneMonitorError::unavailable("binder died")));
        let mut manager = ZoneManager::new(Arc::new(monitor));
        let first = manager.install_exclusive(region_set()).await.expect("first");

        let err = manager
            .install_exclusive(MonitoringSet::default())
            .await
            .expect_err("remove fails");

        assert_eq!(err.phase, InstallPhase::Remove);
        assert_eq!(manager.active().map(|a| a.handle), Some(first));
        assert_eq!(manager.active().map(|a| a.set.len()), Some(1));
    }

    #[tokio::test]
    async fn add_failure_leaves_nothing_active() {
        let mut monitor = MockZoneMonitor::new();
        monitor
            .expect_register_zones()
            .times(1)
            .returning(|_, _| Err(ZoneMonitorError::rejected("too many geofences")));
        let mut manager = ZoneManager::new(Arc::new(monitor));

        let err = manager
            .install_exclusive(region_set())
            .await
            .expect_err("add fails");

        assert_eq!(err.phase, InstallPhase::Add);
        assert!(manager.active().is_none());
        assert_eq!(manager.last_generation(), Some(1));
        assert_eq!(
            TrackerError::from(err),
            TrackerError::ZoneInstallFailed {
                phase: InstallPhase::Add,
                message: "zone monitor rejected the request: too many geofences".to_owned(),
            }
        );
    }
}
