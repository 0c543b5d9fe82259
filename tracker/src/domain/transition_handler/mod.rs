//! The proximity-tier state machine.
//!
//! The handler owns the tier and, through [`ZoneManager`], the installed
//! monitoring set. Events are applied one at a time in delivery order; a
//! batch is drained zone by zone. Every failure ends here: it is logged,
//! recorded in the diagnostics and reported as a [`TransitionOutcome`].

use std::sync::Arc;

use mockable::Clock;
use tracing::{error, info, warn};

use crate::domain::catalog::{Catalog, Region};
use crate::domain::diagnostics::{DiagnosticsSnapshot, TrackerDiagnostics};
use crate::domain::error::{InstallPhase, TrackerError};
use crate::domain::geo::Coordinate;
use crate::domain::monitor_events::{MonitorBatch, monitor_error_message};
use crate::domain::ports::{LocationProvider, Notification, Notifier, ZoneMonitor};
use crate::domain::tier::TierState;
use crate::domain::zone_manager::ZoneManager;
use crate::domain::zones::{MonitoringSet, TransitionKind, ZoneId, ZoneLabel, ZoneSetBuilder};

mod notifications;
mod outcome;

pub use outcome::TransitionOutcome;

/// Handler tunables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSettings {
    /// Total install attempts per transition when the add half fails.
    pub install_attempts: u32,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            install_attempts: 2,
        }
    }
}

/// Driven ports used by the handler.
#[derive(Clone)]
pub struct TransitionHandlerPorts {
    /// Platform zone monitor.
    pub monitor: Arc<dyn ZoneMonitor>,
    /// Notification presenter.
    pub notifier: Arc<dyn Notifier>,
    /// Last-known-location source.
    pub locations: Arc<dyn LocationProvider>,
}

/// Read-only view of the handler for callers outside the processing lane.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSnapshot {
    /// Current tier.
    pub tier: TierState,
    /// Zones of the installed set, in installation order.
    pub active_zones: Vec<ZoneId>,
    /// Counters and failure records.
    pub diagnostics: DiagnosticsSnapshot,
}

/// Sequential state machine over monitor events.
pub struct TransitionHandler {
    catalog: Arc<Catalog>,
    builder: ZoneSetBuilder,
    settings: HandlerSettings,
    zones: ZoneManager,
    notifier: Arc<dyn Notifier>,
    locations: Arc<dyn LocationProvider>,
    tier: TierState,
    diagnostics: TrackerDiagnostics,
}

impl TransitionHandler {
    /// Create a handler outside all regions with nothing installed.
    pub fn new(
        catalog: Arc<Catalog>,
        builder: ZoneSetBuilder,
        settings: HandlerSettings,
        ports: TransitionHandlerPorts,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            builder,
            settings,
            zones: ZoneManager::new(ports.monitor),
            notifier: ports.notifier,
            locations: ports.locations,
            tier: TierState::OutsideAllRegions,
            diagnostics: TrackerDiagnostics::new(clock),
        }
    }

    /// Current tier.
    #[must_use]
    pub const fn tier(&self) -> &TierState {
        &self.tier
    }

    /// Copy of the current tier, installed zones and diagnostics.
    #[must_use]
    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            tier: self.tier.clone(),
            active_zones: self
                .zones
                .active()
                .map(|active| active.set.zone_ids())
                .unwrap_or_default(),
            diagnostics: self.diagnostics.snapshot(),
        }
    }

    /// Enter the initial state: outside all regions with region zones
    /// installed around the last known location.
    ///
    /// Calling it again resets the tracker, which is also the way out of a
    /// degraded state.
    pub async fn bootstrap(&mut self) -> TransitionOutcome {
        let location = self.last_known_location().await;
        let containing = location.and_then(|point| {
            self.catalog
                .containing_region(point, self.builder.settings().region_margin_factor)
                .map(|region| region.name().to_owned())
        });
        info!(?location, containing_region = ?containing, "bootstrapping tracker");
        self.diagnostics.record_bootstrap_region(containing);

        let previous = std::mem::take(&mut self.tier);
        self.install_current_tier(previous, location).await
    }

    /// Drain a monitor batch, one zone at a time in delivery order.
    pub async fn handle_batch(&mut self, batch: MonitorBatch) -> Vec<TransitionOutcome> {
        if let Some(code) = batch.error_code {
            let message = monitor_error_message(code);
            error!(code, message, "monitor reported an error; dropping batch");
            self.diagnostics.record_dropped_batch();
            self.diagnostics
                .record_failure(format!("monitor error {code}: {message}"));
            return vec![TransitionOutcome::MonitorError { code, message }];
        }

        let mut outcomes = Vec::with_capacity(batch.zone_ids.len());
        for zone_id in &batch.zone_ids {
            outcomes.push(self.handle_event(zone_id, batch.transition).await);
        }
        outcomes
    }

    /// Apply a single `(zone id, transition)` event.
    pub async fn handle_event(
        &mut self,
        raw_zone_id: &str,
        transition: TransitionKind,
    ) -> TransitionOutcome {
        let zone_id = match raw_zone_id.parse::<ZoneId>() {
            Ok(zone_id) => zone_id,
            Err(err) => return self.ignore(raw_zone_id, transition, err),
        };

        let outcome = match (zone_id.label(), transition, self.tier.clone()) {
            (ZoneLabel::Region, TransitionKind::Enter, TierState::OutsideAllRegions) => {
                self.enter_region(zone_id).await
            }
            (ZoneLabel::Region, TransitionKind::Exit, TierState::InsideRegion(current))
                if current.id() == zone_id.owner_id() =>
            {
                self.exit_region(current).await
            }
            (ZoneLabel::Poi, TransitionKind::Enter, TierState::InsideRegion(_)) => {
                self.enter_poi(zone_id).await
            }
            (ZoneLabel::Poi, TransitionKind::Exit, TierState::InsideRegion(_)) => {
                self.exit_poi(zone_id).await
            }
            (_, _, tier) => Err(TrackerError::AnomalousTransition {
                zone_id: zone_id.to_string(),
                transition,
                tier: tier.to_string(),
            }),
        };

        match outcome {
            Ok(outcome) => {
                self.diagnostics.record_processed();
                outcome
            }
            Err(err) => self.ignore(raw_zone_id, transition, err),
        }
    }

    async fn enter_region(&mut self, zone_id: ZoneId) -> Result<TransitionOutcome, TrackerError> {
        let region = self.resolve_region(zone_id)?;
        info!(zone_id = %zone_id, region = region.name(), "entered region");
        let notification_id = notifications::region_notification_id(region.id());
        self.notify(notifications::region_entered(&region)).await;

        let previous = std::mem::replace(&mut self.tier, TierState::InsideRegion(region));
        let location = self.last_known_location().await;
        let outcome = self.install_current_tier(previous, location).await;
        if matches!(outcome, TransitionOutcome::RolledBack(_)) {
            self.withdraw(notification_id).await;
        }
        Ok(outcome)
    }

    async fn exit_region(&mut self, region: Region) -> Result<TransitionOutcome, TrackerError> {
        info!(region = region.name(), "left region");
        if let Err(err) = self.notifier.dismiss_all().await {
            warn!(error = %err, "failed to dismiss notifications");
        }

        let previous = std::mem::replace(&mut self.tier, TierState::OutsideAllRegions);
        let location = self.last_known_location().await;
        Ok(self.install_current_tier(previous, location).await)
    }

    async fn enter_poi(&mut self, zone_id: ZoneId) -> Result<TransitionOutcome, TrackerError> {
        let poi = self
            .catalog
            .poi(zone_id.owner_id())
            .ok_or(TrackerError::UnresolvedOwner {
                label: ZoneLabel::Poi,
                owner_id: zone_id.owner_id(),
            })?;
        info!(zone_id = %zone_id, poi = %poi.name, "near point of interest");
        let notification = notifications::poi_entered(poi);
        self.notify(notification).await;
        Ok(TransitionOutcome::Applied)
    }

    async fn exit_poi(&mut self, zone_id: ZoneId) -> Result<TransitionOutcome, TrackerError> {
        info!(zone_id = %zone_id, "left point of interest");
        self.withdraw(notifications::poi_notification_id(zone_id.owner_id()))
            .await;
        Ok(TransitionOutcome::Applied)
    }

    fn resolve_region(&self, zone_id: ZoneId) -> Result<Region, TrackerError> {
        self.catalog
            .region(zone_id.owner_id())
            .cloned()
            .ok_or(TrackerError::UnresolvedOwner {
                label: ZoneLabel::Region,
                owner_id: zone_id.owner_id(),
            })
    }

    /// Install the zone set for the tier just entered.
    ///
    /// A rejected remove restores `previous`, which still matches the set
    /// that stayed registered. A rejected add rebuilds and retries; when
    /// every attempt fails the tracker is degraded.
    async fn install_current_tier(
        &mut self,
        previous: TierState,
        location: Option<Coordinate>,
    ) -> TransitionOutcome {
        let attempts = self.settings.install_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            let set = match self.build_current_set(location) {
                Ok(set) => set,
                Err(err) => {
                    last_error = Some(err);
                    break;
                }
            };

            match self.zones.install_exclusive(set).await {
                Ok(handle) => {
                    self.diagnostics.record_install(handle.generation());
                    return TransitionOutcome::Applied;
                }
                Err(install_error) if install_error.phase == InstallPhase::Remove => {
                    let err = TrackerError::from(install_error);
                    warn!(
                        error = %err,
                        restored_tier = %previous,
                        "previous zones could not be retired; rolling back"
                    );
                    self.diagnostics.record_failure(err.to_string());
                    self.tier = previous;
                    return TransitionOutcome::RolledBack(err);
                }
                Err(install_error) => {
                    let err = TrackerError::from(install_error);
                    warn!(attempt, attempts, error = %err, tier = %self.tier, "zone install failed");
                    last_error = Some(err);
                }
            }
        }

        let err = last_error
            .unwrap_or_else(|| TrackerError::empty_result_set(self.tier.to_string()));
        error!(error = %err, tier = %self.tier, "no monitoring set installed; tracker degraded");
        self.diagnostics.record_failure(err.to_string());
        self.diagnostics.mark_degraded();
        TransitionOutcome::Degraded(err)
    }

    fn build_current_set(&self, location: Option<Coordinate>) -> Result<MonitoringSet, TrackerError> {
        match self.builder.build(&self.tier, &self.catalog, location) {
            Err(TrackerError::EmptyResultSet { scope }) => match &self.tier {
                TierState::InsideRegion(region) => {
                    warn!(%scope, "region owns no points of interest; watching its exit only");
                    Ok(self.builder.region_exit_set(region))
                }
                TierState::OutsideAllRegions => Err(TrackerError::EmptyResultSet { scope }),
            },
            other => other,
        }
    }

    async fn last_known_location(&self) -> Option<Coordinate> {
        match self.locations.last_known_location().await {
            Ok(location) => location,
            Err(err) => {
                warn!(error = %err, "last known location unavailable");
                None
            }
        }
    }

    async fn notify(&self, notification: Notification) {
        let id = notification.id;
        if let Err(err) = self.notifier.show(notification).await {
            warn!(error = %err, notification_id = id, "failed to show notification");
        }
    }

    async fn withdraw(&self, id: u32) {
        if let Err(err) = self.notifier.dismiss(id).await {
            warn!(error = %err, notification_id = id, "failed to dismiss notification");
        }
    }

    fn ignore(
        &mut self,
        raw_zone_id: &str,
        transition: TransitionKind,
        err: TrackerError,
    ) -> TransitionOutcome {
        warn!(
            zone_id = raw_zone_id,
            %transition,
            tier = %self.tier,
            error = %err,
            "ignoring monitor event"
        );
        self.diagnostics.record_ignored();
        TransitionOutcome::Ignored(err)
    }
}
