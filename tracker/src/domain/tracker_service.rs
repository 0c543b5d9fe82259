//! Single processing lane in front of the transition handler.
//!
//! Monitor callbacks may arrive from any task. They are funnelled through
//! one bounded queue into a task that owns the [`TransitionHandler`], so
//! events are handled strictly one at a time and an install always finishes
//! before the next event is looked at.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use super::monitor_events::MonitorBatch;
use super::transition_handler::{TrackerSnapshot, TransitionHandler, TransitionOutcome};

/// The processing task has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("tracker service has shut down")]
pub struct TrackerServiceClosed;

enum Command {
    Bootstrap(oneshot::Sender<TransitionOutcome>),
    Batch(MonitorBatch, oneshot::Sender<Vec<TransitionOutcome>>),
    Snapshot(oneshot::Sender<TrackerSnapshot>),
}

/// Cloneable sender side of the processing lane.
#[derive(Clone)]
pub struct TrackerHandle {
    commands: mpsc::Sender<Command>,
}

impl TrackerHandle {
    /// Reset to the outside tier and install region zones.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceClosed`] once the processing task has ended.
    pub async fn bootstrap(&self) -> Result<TransitionOutcome, TrackerServiceClosed> {
        self.request(Command::Bootstrap).await
    }

    /// Queue a monitor batch and wait for its outcomes.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceClosed`] once the processing task has ended.
    pub async fn submit(
        &self,
        batch: MonitorBatch,
    ) -> Result<Vec<TransitionOutcome>, TrackerServiceClosed> {
        self.request(|reply| Command::Batch(batch, reply)).await
    }

    /// Snapshot the handler after every previously queued command.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceClosed`] once the processing task has ended.
    pub async fn snapshot(&self) -> Result<TrackerSnapshot, TrackerServiceClosed> {
        self.request(Command::Snapshot).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, TrackerServiceClosed> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| TrackerServiceClosed)?;
        response.await.map_err(|_| TrackerServiceClosed)
    }
}

/// Owns the processing task.
pub struct TrackerService;

impl TrackerService {
    /// Move `handler` onto a new task fed by a queue of `capacity` commands.
    ///
    /// The task ends when every [`TrackerHandle`] is dropped and hands the
    /// handler back through the join handle.
    #[must_use]
    pub fn spawn(
        handler: TransitionHandler,
        capacity: usize,
    ) -> (TrackerHandle, JoinHandle<TransitionHandler>) {
        let (commands, mut queue) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(async move {
            let mut handler = handler;
            while let Some(command) = queue.recv().await {
                match command {
                    Command::Bootstrap(reply) => {
                        let outcome = handler.bootstrap().await;
                        if reply.send(outcome).is_err() {
                            debug!("bootstrap caller went away before the reply");
                        }
                    }
                    Command::Batch(batch, reply) => {
                        let outcomes = handler.handle_batch(batch).await;
                        if reply.send(outcomes).is_err() {
                            debug!("batch submitter went away before the reply");
                        }
                    }
                    Command::Snapshot(reply) => {
                        if reply.send(handler.snapshot()).is_err() {
                            debug!("snapshot caller went away before the reply");
                        }
                    }
                }
            }
            debug!("tracker service queue closed");
            handler
        });
        (TrackerHandle { commands }, task)
    }
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::expect_used,
        reason = "test code uses expect for clear failure messages"
    )]

    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::FixtureLocationProvider;
    use crate::domain::transition_handler::{HandlerSettings, TransitionHandlerPorts};
    use crate::domain::{TierState, TransitionKind, ZoneId, ZoneSetBuilder};
    use crate::test_support::catalogs::{lausanne, seeded_catalog};
    use crate::test_support::doubles::{RecordingNotifier, ScriptedZoneMonitor};

    fn handler(monitor: Arc<ScriptedZoneMonitor>) -> TransitionHandler {
        TransitionHandler::new(
            Arc::new(seeded_catalog()),
            ZoneSetBuilder::default(),
            HandlerSettings::default(),
            TransitionHandlerPorts {
                monitor,
                notifier: Arc::new(RecordingNotifier::default()),
                locations: Arc::new(FixtureLocationProvider),
            },
            Arc::new(mockable::DefaultClock),
        )
    }

    #[tokio::test]
    async fn commands_are_processed_in_submission_order() {
        let monitor = Arc::new(ScriptedZoneMonitor::default());
        let (tracker, task) = TrackerService::spawn(handler(monitor.clone()), 4);

        tracker.bootstrap().await.expect("bootstrap");
        let entered = tracker
            .submit(MonitorBatch::new(TransitionKind::Enter, ["REGION_2"]))
            .await
            .expect("enter");
        let poi = tracker
            .submit(MonitorBatch::new(TransitionKind::Enter, ["POI_3"]))
            .await
            .expect("poi");
        let snapshot = tracker.snapshot().await.expect("snapshot");

        assert_eq!(entered, [TransitionOutcome::Applied]);
        assert_eq!(poi, [TransitionOutcome::Applied]);
        assert_eq!(snapshot.tier, TierState::InsideRegion(lausanne()));
        assert_eq!(snapshot.active_zones, [ZoneId::poi(3), ZoneId::region(2)]);

        drop(tracker);
        let handler = task.await.expect("task joins");
        assert_eq!(handler.tier(), &TierState::InsideRegion(lausanne()));
        assert_eq!(monitor.live_registrations(), 1);
    }

    #[tokio::test]
    async fn concurrent_submitters_share_one_lane() {
        let monitor = Arc::new(ScriptedZoneMonitor::default());
        let (tracker, task) = TrackerService::spawn(handler(monitor.clone()), 1);
        tracker.bootstrap().await.expect("bootstrap");

        let submitters = ["REGION_1", "REGION_2"].map(|zone| {
            let tracker = tracker.clone();
            tokio::spawn(async move {
                tracker
                    .submit(MonitorBatch::new(TransitionKind::Enter, [zone]))
                    .await
                    .expect("submit")
            })
        });
        let mut applied = 0;
        for submitter in submitters {
            let outcomes = submitter.await.expect("submitter joins");
            applied += outcomes.iter().filter(|outcome| outcome.is_applied()).count();
        }

        assert_eq!(applied, 1);
        assert_eq!(monitor.live_registrations(), 1);
        drop(tracker);
        task.await.expect("task joins");
    }

    #[tokio::test]
    async fn handles_report_closure_after_the_task_ends() {
        let monitor = Arc::new(ScriptedZoneMonitor::default());
        let (tracker, task) = TrackerService::spawn(handler(monitor), 1);
        task.abort();
        let _ = task.await;

        assert_eq!(tracker.snapshot().await, Err(TrackerServiceClosed));
    }
}
