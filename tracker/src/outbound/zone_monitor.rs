//! In-process zone monitor.
//!
//! Stands in for the platform service when events are replayed from a
//! file. It keeps every live registration and refuses registrations that
//! would push the total past the platform ceiling, the same way the
//! platform reports "too many geofences".

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{MonitorHandle, ZoneMonitor, ZoneMonitorError};
use crate::domain::{MonitoringSet, ZoneId};

/// Default ceiling on concurrently registered zones.
pub const DEFAULT_ZONE_CAPACITY: usize = 100;

/// Registry of live zone registrations keyed by handle.
#[derive(Debug)]
pub struct InMemoryZoneMonitor {
    capacity: usize,
    live: Mutex<BTreeMap<MonitorHandle, MonitoringSet>>,
}

impl Default for InMemoryZoneMonitor {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ZONE_CAPACITY)
    }
}

impl InMemoryZoneMonitor {
    /// Monitor accepting at most `capacity` zones across all registrations.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            live: Mutex::new(BTreeMap::new()),
        }
    }

    /// Zone ids of every live registration, oldest handle first.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneMonitorError::Unavailable`] if the registry is poisoned.
    pub fn live_zone_ids(&self) -> Result<Vec<ZoneId>, ZoneMonitorError> {
        Ok(self
            .lock()?
            .values()
            .flat_map(MonitoringSet::zone_ids)
            .collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<MonitorHandle, MonitoringSet>>, ZoneMonitorError> {
        self.live
            .lock()
            .map_err(|_| ZoneMonitorError::unavailable("zone registry poisoned"))
    }
}

#[async_trait]
impl ZoneMonitor for InMemoryZoneMonitor {
    async fn register_zones(
        &self,
        handle: MonitorHandle,
        set: &MonitoringSet,
    ) -> Result<(), ZoneMonitorError> {
        let mut live = self.lock()?;
        let registered = live.values().map(MonitoringSet::len).sum::<usize>();
        if registered + set.len() > self.capacity {
            return Err(ZoneMonitorError::rejected(format!(
                "Too many geofences: {} live, {} requested, limit {}",
                registered,
                set.len(),
                self.capacity
            )));
        }
        debug!(%handle, zones = set.len(), "zones registered");
        live.insert(handle, set.clone());
        Ok(())
    }

    async fn deregister_zones(&self, handle: MonitorHandle) -> Result<(), ZoneMonitorError> {
        if self.lock()?.remove(&handle).is_some() {
            debug!(%handle, "zones deregistered");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::expect_used,
        reason = "test code uses expect for clear failure messages"
    )]

    use super::*;
    use crate::domain::ZoneSetBuilder;
    use crate::test_support::catalogs::seeded_catalog;

    fn region_set() -> MonitoringSet {
        ZoneSetBuilder::default()
            .region_tier(&seeded_catalog(), None)
            .expect("region set")
    }

    #[tokio::test]
    async fn registrations_replace_after_deregistration() {
        let monitor = InMemoryZoneMonitor::default();

        monitor
            .register_zones(MonitorHandle::new(1), &region_set())
            .await
            .expect("register");
        monitor
            .deregister_zones(MonitorHandle::new(1))
            .await
            .expect("deregister");
        monitor
            .register_zones(MonitorHandle::new(2), &region_set())
            .await
            .expect("register again");

        assert_eq!(
            monitor.live_zone_ids().expect("live"),
            [ZoneId::region(1), ZoneId::region(2)]
        );
    }

    #[tokio::test]
    async fn registrations_beyond_capacity_are_rejected() {
        let monitor = InMemoryZoneMonitor::with_capacity(3);
        monitor
            .register_zones(MonitorHandle::new(1), &region_set())
            .await
            .expect("register");

        let err = monitor
            .register_zones(MonitorHandle::new(2), &region_set())
            .await
            .expect_err("over capacity");

        assert!(matches!(err, ZoneMonitorError::Rejected { .. }));
        assert_eq!(monitor.live_zone_ids().expect("live").len(), 2);
    }
}
