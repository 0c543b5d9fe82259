//! Replay recorded monitor deliveries through the POI proximity tracker.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use poi_tracker::config::TrackerSettings;
use poi_tracker::domain::{
    CatalogBootstrap, Coordinate, TrackerService, TransitionHandler, TransitionHandlerPorts,
    ZoneSetBuilder,
};
use poi_tracker::inbound::replay::{read_batches, replay};
use poi_tracker::outbound::catalog_files::FileCatalogRepository;
use poi_tracker::outbound::location::FixedLocationProvider;
use poi_tracker::outbound::notifications::TracingNotifier;
use poi_tracker::outbound::zone_monitor::InMemoryZoneMonitor;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `poi-tracker` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "poi-tracker",
    about = "Replay recorded geofence transitions through the two-tier POI tracker",
    version
)]
struct CliArgs {
    /// JSON Lines recording of monitor deliveries.
    #[arg(long = "events", value_name = "path")]
    events: PathBuf,
    /// Last known location as `lat,long`, used to order region zones.
    #[arg(long = "location", value_name = "lat,long", value_parser = parse_location)]
    location: Option<Coordinate>,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = TrackerSettings::load_from_iter([OsString::from("poi-tracker")])
        .map_err(|error| io::Error::other(format!("load configuration: {error}")))?;
    let batches = read_batches(&args.events).map_err(io::Error::other)?;

    let repository = FileCatalogRepository::new(
        utf8_path(settings.seed_path())?,
        utf8_path(settings.expanded_path())?,
    );
    let catalog = CatalogBootstrap::open(&repository)
        .await
        .map_err(|error| io::Error::other(format!("open catalog: {error}")))?;

    let monitor = Arc::new(InMemoryZoneMonitor::with_capacity(
        settings.zone_settings().max_zones,
    ));
    let notifier = Arc::new(TracingNotifier::default());
    let handler = TransitionHandler::new(
        Arc::new(catalog),
        ZoneSetBuilder::new(settings.zone_settings()),
        settings.handler_settings(),
        TransitionHandlerPorts {
            monitor: monitor.clone(),
            notifier: notifier.clone(),
            locations: Arc::new(FixedLocationProvider::new(args.location)),
        },
        Arc::new(DefaultClock),
    );
    let (tracker, task) = TrackerService::spawn(handler, settings.queue_capacity());

    let closed = |error| io::Error::other(format!("tracker stopped: {error}"));
    let bootstrap = tracker.bootstrap().await.map_err(closed)?;
    let report = replay(&tracker, batches).await.map_err(closed)?;
    let snapshot = tracker.snapshot().await.map_err(closed)?;
    drop(tracker);
    task.await
        .map_err(|error| io::Error::other(format!("tracker task failed: {error}")))?;

    println!("bootstrap={bootstrap:?}");
    println!("batches={}", report.batches);
    println!("applied={}", report.applied);
    println!("ignored={}", report.ignored);
    println!("rolled_back={}", report.rolled_back);
    println!("degraded={}", report.degraded);
    println!("monitor_errors={}", report.monitor_errors);
    println!("tier={}", snapshot.tier);
    println!("active_zones={}", join(&snapshot.active_zones));
    if let Some(failure) = &snapshot.diagnostics.last_failure {
        println!("last_failure={}", failure.message);
    }
    let zones = monitor.live_zone_ids().map_err(io::Error::other)?;
    println!("monitored_zones={}", join(&zones));
    let visible = notifier.visible().map_err(io::Error::other)?;
    let ids: Vec<u32> = visible.iter().map(|notification| notification.id).collect();
    println!("visible_notifications={}", join(&ids));

    Ok(())
}

fn parse_location(raw: &str) -> Result<Coordinate, String> {
    let values = raw
        .split(',')
        .map(str::trim)
        .map(str::parse::<f64>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| format!("failed to parse location value: {error}"))?;
    let [latitude, longitude] = values.as_slice() else {
        return Err("location must contain exactly two comma-separated numeric values".to_owned());
    };
    Coordinate::new(*latitude, *longitude).map_err(|error| error.to_string())
}

fn utf8_path(path: PathBuf) -> io::Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).map_err(|path| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("path is not valid UTF-8: {}", path.display()),
        )
    })
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
