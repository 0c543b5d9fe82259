//! Replay of recorded monitor deliveries.
//!
//! A recording is a JSON Lines file with one [`MonitorBatch`] per line:
//!
//! ```text
//! {"zoneIds": ["REGION_2"], "transition": "ENTER"}
//! {"zoneIds": ["POI_3"], "transition": "ENTER"}
//! {"transition": "EXIT", "errorCode": 1000}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use thiserror::Error;
use tracing::info;

use crate::domain::{MonitorBatch, TrackerHandle, TrackerServiceClosed, TransitionOutcome};

/// Failures while reading a recording.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The recording could not be opened or read.
    #[error("failed to read recording '{path}': {source}")]
    Read {
        /// Recording path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A line is not a valid batch.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Decoder message.
        message: String,
    },
}

/// Parse a JSON Lines recording.
///
/// # Errors
///
/// Returns [`ReplayError::Parse`] naming the first line that fails to decode.
///
/// # Examples
/// ```
/// use poi_tracker::inbound::replay::parse_batches;
///
/// let batches = parse_batches("# arrival\n{\"zoneIds\": [\"REGION_2\"], \"transition\": \"ENTER\"}\n")?;
/// assert_eq!(batches[0].zone_ids, ["REGION_2"]);
/// # Ok::<(), poi_tracker::inbound::replay::ReplayError>(())
/// ```
pub fn parse_batches(recording: &str) -> Result<Vec<MonitorBatch>, ReplayError> {
    recording
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, text)| {
            serde_json::from_str(text).map_err(|error| ReplayError::Parse {
                line,
                message: error.to_string(),
            })
        })
        .collect()
}

/// Read and parse the recording at `path`.
///
/// # Errors
///
/// Returns [`ReplayError::Read`] when the file cannot be read and
/// [`ReplayError::Parse`] when a line fails to decode.
pub fn read_batches(path: &Path) -> Result<Vec<MonitorBatch>, ReplayError> {
    let read_error = |source: io::Error| ReplayError::Read {
        path: path.to_path_buf(),
        source,
    };
    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        read_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "recording path must be a file",
        ))
    })?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    let recording = directory
        .read_to_string(Path::new(file_name))
        .map_err(read_error)?;
    parse_batches(&recording)
}

/// Tally of outcomes across a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Batches submitted.
    pub batches: usize,
    /// Events applied.
    pub applied: usize,
    /// Events ignored.
    pub ignored: usize,
    /// Events whose install was rolled back.
    pub rolled_back: usize,
    /// Events that left the tracker degraded.
    pub degraded: usize,
    /// Batches dropped for a monitor error code.
    pub monitor_errors: usize,
}

impl ReplayReport {
    fn record(&mut self, outcome: &TransitionOutcome) {
        match outcome {
            TransitionOutcome::Applied => self.applied += 1,
            TransitionOutcome::Ignored(_) => self.ignored += 1,
            TransitionOutcome::RolledBack(_) => self.rolled_back += 1,
            TransitionOutcome::Degraded(_) => self.degraded += 1,
            TransitionOutcome::MonitorError { .. } => self.monitor_errors += 1,
        }
    }
}

/// Submit `batches` in order and tally their outcomes.
///
/// # Errors
///
/// Returns [`TrackerServiceClosed`] if the tracker stops mid-replay.
pub async fn replay(
    tracker: &TrackerHandle,
    batches: Vec<MonitorBatch>,
) -> Result<ReplayReport, TrackerServiceClosed> {
    let mut report = ReplayReport::default();
    for batch in batches {
        let outcomes = tracker.submit(batch).await?;
        report.batches += 1;
        for outcome in &outcomes {
            report.record(outcome);
        }
    }
    info!(
        batches = report.batches,
        applied = report.applied,
        ignored = report.ignored,
        "replay finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::expect_used,
        reason = "test code uses expect for clear failure messages"
    )]

    use std::sync::Arc;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::domain::ports::FixtureLocationProvider;
    use crate::domain::{
        HandlerSettings, TrackerService, TransitionHandler, TransitionHandlerPorts,
        TransitionKind, ZoneSetBuilder,
    };
    use crate::test_support::cap_fs::write_file;
    use crate::test_support::catalogs::seeded_catalog;
    use crate::test_support::doubles::{RecordingNotifier, ScriptedZoneMonitor};

    const RECORDING: &str = r#"
# arrive in Lausanne
{"zoneIds": ["REGION_2"], "transition": "ENTER"}
{"zoneIds": ["POI_3", "CITY_5"], "transition": "ENTER"}
{"transition": "EXIT", "errorCode": 1000}
{"zoneIds": ["REGION_2"], "transition": "EXIT"}
"#;

    #[rstest]
    fn comments_and_blank_lines_are_skipped() {
        let batches = parse_batches(RECORDING).expect("recording parses");

        assert_eq!(batches.len(), 4);
        assert_eq!(batches[1].zone_ids, ["POI_3", "CITY_5"]);
        assert_eq!(batches[2].error_code, Some(1_000));
        assert!(batches[2].zone_ids.is_empty());
        assert_eq!(batches[3].transition, TransitionKind::Exit);
    }

    #[rstest]
    #[case::unknown_transition(r#"{"zoneIds": [], "transition": "DWELL"}"#)]
    #[case::not_json("REGION_2 ENTER")]
    fn parse_errors_name_the_line(#[case] bad_line: &str) {
        let recording = format!("{{\"zoneIds\": [\"REGION_2\"], \"transition\": \"ENTER\"}}\n\n{bad_line}\n");

        let err = parse_batches(&recording).expect_err("bad line");

        assert!(matches!(err, ReplayError::Parse { line: 3, .. }));
    }

    #[rstest]
    fn recordings_are_read_from_disk() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("events.jsonl");
        write_file(&path, RECORDING.as_bytes()).expect("write recording");

        let batches = read_batches(&path).expect("read recording");

        assert_eq!(batches.len(), 4);
    }

    #[rstest]
    fn missing_recordings_are_read_errors() {
        let dir = TempDir::new().expect("temp dir");

        let err = read_batches(&dir.path().join("absent.jsonl")).expect_err("missing");

        assert!(matches!(err, ReplayError::Read { .. }));
    }

    #[tokio::test]
    async fn replay_tallies_every_outcome() {
        let handler = TransitionHandler::new(
            Arc::new(seeded_catalog()),
            ZoneSetBuilder::default(),
            HandlerSettings::default(),
            TransitionHandlerPorts {
                monitor: Arc::new(ScriptedZoneMonitor::default()),
                notifier: Arc::new(RecordingNotifier::default()),
                locations: Arc::new(FixtureLocationProvider),
            },
            Arc::new(mockable::DefaultClock),
        );
        let (tracker, _task) = TrackerService::spawn(handler, 8);
        tracker.bootstrap().await.expect("bootstrap");

        let report = replay(&tracker, parse_batches(RECORDING).expect("parse"))
            .await
            .expect("replay");

        assert_eq!(
            report,
            ReplayReport {
                batches: 4,
                applied: 3,
                ignored: 1,
                rolled_back: 0,
                degraded: 0,
                monitor_errors: 1,
            }
        );
    }
}
