//! Outbound adapters implementing domain ports for the tracker's
//! surroundings.
//!
//! - **catalog_files**: seed and expanded-list storage via `catalog-data`
//! - **zone_monitor**: an in-process monitor that enforces the zone ceiling
//! - **notifications**: a notifier that logs and tracks visible alerts
//! - **location**: a fixed last-known-location source
//!
//! Adapters are thin translators that convert between domain types and
//! their external representations. They contain no tracking logic.

pub mod catalog_files;
pub mod location;
pub mod notifications;
pub mod zone_monitor;
