//! Two-tier geofence tracker for regions and points of interest.
//!
//! While travelling, the tracker monitors one zone per region. On entering
//! a region it swaps those out for zones around the region's points of
//! interest plus one exit zone, and swaps back when the region is left.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
