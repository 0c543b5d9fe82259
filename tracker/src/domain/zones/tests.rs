//! Zone identifier parsing and zone-set derivation.
#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use rstest::{fixture, rstest};

use super::*;
use crate::domain::catalog::Poi;

fn coord(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).expect("valid coordinate")
}

fn geneva() -> Region {
    Region::new(1, "Geneva", coord(46.2, 6.15), 16).expect("geneva")
}

fn lausanne() -> Region {
    Region::new(2, "Lausanne", coord(46.519_833, 6.6335), 42).expect("lausanne")
}

fn raw_poi(name: &str, lat: f64, lng: f64) -> Poi {
    Poi {
        name: name.to_owned(),
        location: coord(lat, lng),
        category: "Test".to_owned(),
    }
}

#[fixture]
fn builder() -> ZoneSetBuilder {
    ZoneSetBuilder::new(ZoneSettings::default())
}

#[fixture]
fn seeded_catalog() -> Catalog {
    Catalog::build(
        vec![geneva(), lausanne()],
        &[
            raw_poi("Epicerie Delices", 46.206_169, 6.132_623),
            raw_poi("Planete Charmilles", 46.208_333, 6.124_292),
            raw_poi("Geosatis", 46.517_494, 6.562_019),
        ],
    )
    .expect("catalog")
}

/// `count` POIs north of Lausanne, listed out of distance order. The POI
/// at offset `k` sits `k + 1` steps away from the centroid.
fn crowded_catalog(count: u32) -> Catalog {
    let raw = (0..count)
        .map(|i| {
            let offset = (i * 37) % count;
            raw_poi(
                &format!("Stop {offset}"),
                46.519_833 + f64::from(offset + 1) * 0.000_1,
                6.6335,
            )
        })
        .collect::<Vec<_>>();
    Catalog::build(vec![lausanne()], &raw).expect("catalog")
}

#[rstest]
#[case("REGION_2", ZoneId::region(2))]
#[case("POI_7", ZoneId::poi(7))]
#[case("POI_1000", ZoneId::poi(1_000))]
fn well_formed_identifiers_parse(#[case] raw: &str, #[case] expected: ZoneId) {
    let parsed: ZoneId = raw.parse().expect("valid id");
    assert_eq!(parsed, expected);
    assert_eq!(parsed.to_string(), raw);
}

#[rstest]
#[case("CITY_5")]
#[case("REGION")]
#[case("REGION_")]
#[case("REGION_0")]
#[case("REGION_-1")]
#[case("REGION_+3")]
#[case("POI_7_1")]
#[case("poi_7")]
#[case("POI_seven")]
#[case("")]
fn malformed_identifiers_are_rejected(#[case] raw: &str) {
    assert_eq!(
        raw.parse::<ZoneId>(),
        Err(TrackerError::malformed_event_id(raw))
    );
}

#[rstest]
#[case(TransitionMask::EnterExit, TransitionKind::Enter, true)]
#[case(TransitionMask::EnterExit, TransitionKind::Exit, true)]
#[case(TransitionMask::ExitOnly, TransitionKind::Enter, false)]
#[case(TransitionMask::ExitOnly, TransitionKind::Exit, true)]
fn masks_report_requested_transitions(
    #[case] mask: TransitionMask,
    #[case] kind: TransitionKind,
    #[case] expected: bool,
) {
    assert_eq!(mask.reports(kind), expected);
}

#[rstest]
fn region_tier_without_location_keeps_catalog_order(
    builder: ZoneSetBuilder,
    seeded_catalog: Catalog,
) {
    let set = builder
        .region_tier(&seeded_catalog, None)
        .expect("region set");

    assert_eq!(set.zone_ids(), [ZoneId::region(1), ZoneId::region(2)]);
    for zone in set.zones() {
        assert_eq!(zone.responsiveness(), Duration::from_secs(300));
        assert_eq!(zone.transition_mask(), TransitionMask::EnterExit);
        assert_eq!(zone.initial_trigger(), Some(TransitionKind::Enter));
        assert_eq!(zone.expires_after(), None);
    }
}

#[rstest]
fn region_tier_orders_by_distance_and_throttles(
    builder: ZoneSetBuilder,
    seeded_catalog: Catalog,
) {
    let near_lausanne = coord(46.52, 6.63);
    let set = builder
        .region_tier(&seeded_catalog, Some(near_lausanne))
        .expect("region set");

    assert_eq!(set.zone_ids(), [ZoneId::region(2), ZoneId::region(1)]);
    let lausanne_zone = set.zone(ZoneId::region(2)).expect("lausanne zone");
    assert_eq!(lausanne_zone.responsiveness(), Duration::from_secs(12));

    let geneva_zone = set.zone(ZoneId::region(1)).expect("geneva zone");
    let expected_secs = distance_meters(near_lausanne, geneva().center()) / (100_000.0 / 3_600.0);
    assert!((geneva_zone.responsiveness().as_secs_f64() - expected_secs).abs() < 1e-6);
    assert!((geneva_zone.radius_meters() - geneva().radius_meters()).abs() < 1e-9);
}

#[rstest]
fn distant_regions_are_capped_at_one_hour(builder: ZoneSetBuilder, seeded_catalog: Catalog) {
    let far_away = coord(-33.9, 151.2);
    let set = builder
        .region_tier(&seeded_catalog, Some(far_away))
        .expect("region set");
    assert!(
        set.zones()
            .iter()
            .all(|zone| zone.responsiveness() == Duration::from_secs(3_600))
    );
}

#[rstest]
fn poi_tier_filters_by_region_name(builder: ZoneSetBuilder, seeded_catalog: Catalog) {
    let set = builder
        .poi_tier(&seeded_catalog, "Geneva", None)
        .expect("poi set");

    assert_eq!(set.zone_ids(), [ZoneId::poi(1), ZoneId::poi(2)]);
    for zone in set.zones() {
        assert!((zone.radius_meters() - 200.0).abs() < f64::EPSILON);
        assert_eq!(zone.notification_responsiveness_ms(), 300_000);
    }
}

#[rstest]
fn region_without_pois_yields_empty_result(builder: ZoneSetBuilder) {
    let catalog = Catalog::new(vec![geneva(), lausanne()], Vec::new()).expect("catalog");
    let result = builder.poi_tier(&catalog, "Lausanne", None);
    assert!(matches!(result, Err(TrackerError::EmptyResultSet { .. })));
}

#[rstest]
fn one_hundred_fifty_pois_are_capped_at_ninety_nine_nearest(builder: ZoneSetBuilder) {
    let catalog = crowded_catalog(150);
    let center = lausanne().center();

    let set = builder
        .poi_tier(&catalog, "Lausanne", Some(center))
        .expect("poi set");

    assert_eq!(set.len(), 99);
    let distances = set
        .zones()
        .iter()
        .map(|zone| distance_meters(center, zone.center()))
        .collect::<Vec<_>>();
    assert!(distances.windows(2).all(|pair| pair[0] <= pair[1]));
    let farthest_kept = distances.last().copied().expect("non-empty");
    let dropped_nearer = catalog
        .pois()
        .iter()
        .filter(|poi| set.zone(ZoneId::poi(poi.id)).is_none())
        .any(|poi| distance_meters(center, poi.location) < farthest_kept);
    assert!(!dropped_nearer);
}

#[rstest]
fn one_hundred_fifty_regions_are_capped_at_ninety_nine_nearest(builder: ZoneSetBuilder) {
    let regions = (0..150_u32)
        .map(|i| {
            let id = (i * 37) % 150 + 1;
            let center = coord(10.0 + f64::from(id) * 0.01, 20.0);
            Region::new(id, format!("Region {id}"), center, 1).expect("region")
        })
        .collect::<Vec<_>>();
    let catalog = Catalog::new(regions, Vec::new()).expect("catalog");

    let set = builder
        .region_tier(&catalog, Some(coord(10.0, 20.0)))
        .expect("region set");

    assert_eq!(set.len(), 99);
    let expected = (1..=99).map(ZoneId::region).collect::<Vec<_>>();
    assert_eq!(set.zone_ids(), expected);
}

#[rstest]
#[case::no_room(0)]
#[case::room_for_the_exit_only(1)]
fn a_ceiling_without_room_reports_an_empty_set(
    seeded_catalog: Catalog,
    #[case] max_zones: usize,
) {
    let builder = ZoneSetBuilder::new(ZoneSettings {
        max_zones,
        ..ZoneSettings::default()
    });

    let regions = builder.region_tier(&seeded_catalog, None);
    let pois = builder.poi_tier(&seeded_catalog, "Geneva", None);

    assert!(matches!(regions, Err(TrackerError::EmptyResultSet { .. })));
    assert!(matches!(pois, Err(TrackerError::EmptyResultSet { .. })));
}

#[rstest]
#[case(3, 4)]
#[case(99, 100)]
#[case(100, 100)]
#[case(150, 100)]
fn inside_region_set_never_exceeds_the_ceiling(
    builder: ZoneSetBuilder,
    #[case] poi_count: u32,
    #[case] expected_len: usize,
) {
    let catalog = crowded_catalog(poi_count);
    let tier = TierState::InsideRegion(lausanne());

    let set = builder
        .build(&tier, &catalog, Some(lausanne().center()))
        .expect("set");

    assert_eq!(set.len(), expected_len);
    let exit_zone = set.zones().last().expect("exit zone");
    assert_eq!(exit_zone.id(), ZoneId::region(2));
    assert_eq!(exit_zone.transition_mask(), TransitionMask::ExitOnly);
    assert_eq!(
        set.zones()
            .iter()
            .filter(|zone| zone.id().label() == ZoneLabel::Region)
            .count(),
        1
    );
}

#[rstest]
fn building_twice_is_idempotent(builder: ZoneSetBuilder) {
    let catalog = crowded_catalog(120);
    let tier = TierState::InsideRegion(lausanne());
    let reference = Some(coord(46.52, 6.633));

    let first = builder.build(&tier, &catalog, reference).expect("first");
    let second = builder.build(&tier, &catalog, reference).expect("second");

    assert_eq!(first.zone_ids(), second.zone_ids());
    let radii = |set: &MonitoringSet| {
        set.zones()
            .iter()
            .map(Zone::radius_meters)
            .collect::<Vec<_>>()
    };
    assert_eq!(radii(&first), radii(&second));
}
