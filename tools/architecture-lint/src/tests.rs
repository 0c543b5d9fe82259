//! Unit tests for the layer rules.

use rstest::rstest;

use super::*;

fn violations_in(path: &str, text: &str) -> Vec<Violation> {
    match check_sources(&[SourceFile::new(path, text)]) {
        Ok(()) => Vec::new(),
        Err(LintError::Violations(violations)) => violations,
        Err(other) => panic!("expected a clean run or violations, got {other}"),
    }
}

fn targets_in(path: &str, text: &str) -> Vec<Target> {
    violations_in(path, text)
        .into_iter()
        .map(|violation| violation.target)
        .collect()
}

#[rstest]
#[case::inbound_drives_the_domain(
    "inbound/replay.rs",
    "use crate::domain::{MonitorBatch, TrackerHandle}; fn parse() -> Vec<MonitorBatch> { Vec::new() }"
)]
#[case::domain_logs(
    "domain/catalog_bootstrap.rs",
    "use tracing::{info, warn}; fn open() { info!(\"loaded\"); }"
)]
#[case::domain_uses_siblings(
    "domain/transition_handler/mod.rs",
    "use super::super::zones::ZoneId; use self::outcome::TransitionOutcome;"
)]
#[case::outbound_owns_the_catalog_format(
    "outbound/catalog_files.rs",
    "use catalog_data::PersistedCatalogFile; use crate::domain::ports::CatalogRepository;"
)]
#[case::outbound_reads_files(
    "outbound/catalog_files.rs",
    "fn open() { let _ = cap_std::ambient_authority(); }"
)]
fn allowed_dependencies_pass(#[case] path: &str, #[case] text: &str) {
    let violations = violations_in(path, text);
    assert!(violations.is_empty(), "unexpected violations: {violations:?}");
}

#[rstest]
#[case::inbound_uses_outbound(
    "inbound/replay.rs",
    "use crate::outbound::zone_monitor::InMemoryZoneMonitor;",
    Target::Module("outbound")
)]
#[case::inbound_uses_bare_outbound(
    "inbound/replay.rs",
    "fn run() { let _ = outbound::notifications::TracingNotifier::default(); }",
    Target::Module("outbound")
)]
#[case::inbound_uses_the_crate_name(
    "inbound/replay.rs",
    "use poi_tracker::outbound::catalog_files::FileCatalogRepository;",
    Target::Module("outbound")
)]
#[case::inbound_reads_the_catalog_format(
    "inbound/replay.rs",
    "use catalog_data::SeedDocument;",
    Target::Crate("catalog_data")
)]
#[case::domain_reads_settings(
    "domain/zones.rs",
    "use crate::config::TrackerSettings;",
    Target::Module("config")
)]
#[case::domain_opens_files(
    "domain/catalog.rs",
    "fn open() { let _ = ::cap_std::ambient_authority(); }",
    Target::Crate("cap_std")
)]
#[case::domain_decodes_json(
    "domain/monitor_events.rs",
    "fn decode(raw: &str) { let _ = serde_json::from_str::<u32>(raw); }",
    Target::Crate("serde_json")
)]
#[case::outbound_uses_inbound_through_super(
    "outbound/zone_monitor.rs",
    "use super::super::inbound::replay;",
    Target::Module("inbound")
)]
#[case::outbound_installs_a_subscriber(
    "outbound/notifications.rs",
    "use tracing_subscriber::fmt;",
    Target::Crate("tracing_subscriber")
)]
fn forbidden_dependencies_are_reported(
    #[case] path: &str,
    #[case] text: &str,
    #[case] expected: Target,
) {
    assert_eq!(targets_in(path, text), [expected]);
}

#[rstest]
fn grouped_imports_report_the_first_offending_path() {
    let violations = violations_in(
        "domain/geo.rs",
        "use crate::{domain::zones, outbound::{location::FixedLocationProvider, zone_monitor}};",
    );

    let [violation] = violations.as_slice() else {
        panic!("expected one violation, got {violations:?}");
    };
    assert_eq!(violation.layer, Layer::Domain);
    assert_eq!(
        violation.path,
        "crate::outbound::location::FixedLocationProvider"
    );
    assert_eq!(
        violation.to_string(),
        "domain/geo.rs: domain names crate::outbound via \
         `crate::outbound::location::FixedLocationProvider` \
         (the domain reaches adapters through ports)"
    );
}

#[rstest]
fn one_file_can_break_several_rules() {
    let targets = targets_in(
        "domain/geo.rs",
        "use clap::Parser; use crate::outbound::location; use clap::Args;",
    );
    assert_eq!(
        targets,
        [Target::Module("outbound"), Target::Crate("clap")]
    );
}

#[rstest]
#[case::binary("main.rs")]
#[case::settings("config.rs")]
#[case::lookalike("domains/zones.rs")]
fn files_outside_the_layers_are_rejected(#[case] path: &str) {
    let result = check_sources(&[SourceFile::new(path, "fn load() {}")]);
    assert!(matches!(result, Err(LintError::OutsideLayers { .. })));
}

#[rstest]
fn unparsable_files_name_the_path() {
    let err = check_sources(&[SourceFile::new("domain/geo.rs", "fn broken( {")])
        .expect_err("parse failure");
    assert!(err.to_string().starts_with("failed to parse domain/geo.rs"));
}
