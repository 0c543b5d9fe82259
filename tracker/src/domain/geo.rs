//! Geodesic helpers on latitude/longitude pairs.
//!
//! Distances use Vincenty's inverse formula on the WGS84 ellipsoid with the
//! same iteration limits as the Android location stack, so results match the
//! platform's own distance checks to the metre.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::TrackerError;

const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const WGS84_SEMI_MINOR_AXIS: f64 = 6_356_752.3142;
const MAX_ITERATIONS: usize = 20;
const CONVERGENCE_THRESHOLD: f64 = 1.0e-12;

/// A validated WGS84 position in degrees.
///
/// # Examples
/// ```
/// use poi_tracker::domain::Coordinate;
///
/// let lausanne = Coordinate::new(46.519_833, 6.6335)?;
/// assert_eq!(lausanne.latitude(), 46.519_833);
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// # Ok::<(), poi_tracker::domain::TrackerError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Validate and build a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidInput`] when either component is not
    /// finite or lies outside its range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, TrackerError> {
        validate_component(latitude, 90.0, "latitude")?;
        validate_component(longitude, 180.0, "longitude")?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

fn validate_component(value: f64, bound: f64, field: &str) -> Result<(), TrackerError> {
    if !value.is_finite() || !(-bound..=bound).contains(&value) {
        return Err(TrackerError::invalid_input(format!(
            "{field} {value} outside [-{bound}, {bound}]"
        )));
    }
    Ok(())
}

/// Ellipsoidal distance in metres between two coordinates.
///
/// Symmetric, and exactly zero for identical points.
#[must_use]
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let flattening = (WGS84_SEMI_MAJOR_AXIS - WGS84_SEMI_MINOR_AXIS) / WGS84_SEMI_MAJOR_AXIS;
    let second_eccentricity_sq = (WGS84_SEMI_MAJOR_AXIS * WGS84_SEMI_MAJOR_AXIS
        - WGS84_SEMI_MINOR_AXIS * WGS84_SEMI_MINOR_AXIS)
        / (WGS84_SEMI_MINOR_AXIS * WGS84_SEMI_MINOR_AXIS);

    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let lon_delta = (b.longitude - a.longitude).to_radians();

    let reduced1 = ((1.0 - flattening) * lat1.tan()).atan();
    let reduced2 = ((1.0 - flattening) * lat2.tan()).atan();
    let (sin_u1, cos_u1) = reduced1.sin_cos();
    let (sin_u2, cos_u2) = reduced2.sin_cos();
    let cos_u1_cos_u2 = cos_u1 * cos_u2;
    let sin_u1_sin_u2 = sin_u1 * sin_u2;

    let mut sigma = 0.0;
    let mut delta_sigma = 0.0;
    let mut big_a = 0.0;
    let mut lambda = lon_delta;

    for _ in 0..MAX_ITERATIONS {
        let previous_lambda = lambda;
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let t1 = cos_u2 * sin_lambda;
        let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        let sin_sigma = (t1 * t1 + t2 * t2).sqrt();
        let cos_sigma = sin_u1_sin_u2 + cos_u1_cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = if sin_sigma == 0.0 {
            0.0
        } else {
            cos_u1_cos_u2 * sin_lambda / sin_sigma
        };
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let cos_2sm = if cos_sq_alpha == 0.0 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1_sin_u2 / cos_sq_alpha
        };

        let u_squared = cos_sq_alpha * second_eccentricity_sq;
        big_a = 1.0
            + (u_squared / 16_384.0)
                * (4_096.0 + u_squared * (-768.0 + u_squared * (320.0 - 175.0 * u_squared)));
        let big_b = (u_squared / 1_024.0)
            * (256.0 + u_squared * (-128.0 + u_squared * (74.0 - 47.0 * u_squared)));
        let big_c = (flattening / 16.0) * cos_sq_alpha * (4.0 + flattening * (4.0 - 3.0 * cos_sq_alpha));
        let cos_2sm_sq = cos_2sm * cos_2sm;
        delta_sigma = big_b
            * sin_sigma
            * (cos_2sm
                + (big_b / 4.0)
                    * (cos_sigma * (-1.0 + 2.0 * cos_2sm_sq)
                        - (big_b / 6.0)
                            * cos_2sm
                            * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                            * (-3.0 + 4.0 * cos_2sm_sq)));

        lambda = lon_delta
            + (1.0 - big_c)
                * flattening
                * sin_alpha
                * (sigma
                    + big_c
                        * sin_sigma
                        * (cos_2sm + big_c * cos_sigma * (-1.0 + 2.0 * cos_2sm * cos_2sm)));

        if lambda == 0.0 || ((lambda - previous_lambda) / lambda).abs() < CONVERGENCE_THRESHOLD {
            break;
        }
    }

    WGS84_SEMI_MINOR_AXIS * big_a * (sigma - delta_sigma)
}

/// Radius in metres of the circle whose area is `area_km2` square kilometres.
///
/// # Errors
///
/// Returns [`TrackerError::InvalidInput`] when the area is zero.
///
/// # Examples
/// ```
/// use poi_tracker::domain::containment_radius;
///
/// let radius = containment_radius(42)?;
/// assert!((radius - 3_656.37).abs() < 0.01);
/// assert!(containment_radius(0).is_err());
/// # Ok::<(), poi_tracker::domain::TrackerError>(())
/// ```
pub fn containment_radius(area_km2: u32) -> Result<f64, TrackerError> {
    if area_km2 == 0 {
        return Err(TrackerError::invalid_input("region area must be positive"));
    }
    Ok((f64::from(area_km2) / PI).sqrt() * 1_000.0)
}

/// Whether `point` lies inside the circle around `center`, widened by
/// `margin_factor`. The boundary itself counts as inside.
#[must_use]
pub fn is_within(point: Coordinate, center: Coordinate, radius: f64, margin_factor: f64) -> bool {
    distance_meters(point, center) <= radius * margin_factor
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::expect_used,
        reason = "test code uses expect for clear failure messages"
    )]

    use rstest::rstest;

    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).expect("valid coordinate")
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(46.519_833, 6.6335)]
    #[case(-89.9, 179.9)]
    #[case(90.0, -180.0)]
    fn distance_to_self_is_zero(#[case] lat: f64, #[case] lng: f64) {
        let c = coord(lat, lng);
        assert_eq!(distance_meters(c, c), 0.0);
    }

    #[test]
    fn one_degree_of_longitude_on_the_equator() {
        let distance = distance_meters(coord(0.0, 0.0), coord(0.0, 1.0));
        assert!((distance - 111_319.49).abs() < 0.01, "got {distance}");
    }

    #[test]
    fn distance_is_symmetric() {
        let geneva = coord(46.2, 6.15);
        let lausanne = coord(46.519_833, 6.6335);
        let there = distance_meters(geneva, lausanne);
        let back = distance_meters(lausanne, geneva);
        assert!((there - back).abs() < 1e-6);
        assert!(there > 50_000.0 && there < 52_000.0, "got {there}");
    }

    #[rstest]
    #[case(1)]
    #[case(16)]
    #[case(42)]
    #[case(1_000)]
    fn radius_matches_circle_area(#[case] area: u32) {
        let radius = containment_radius(area).expect("positive area");
        let expected = (f64::from(area) / PI).sqrt() * 1_000.0;
        assert!((radius - expected).abs() < 1e-9);
    }

    #[test]
    fn zero_area_is_rejected() {
        assert!(matches!(
            containment_radius(0),
            Err(TrackerError::InvalidInput { .. })
        ));
    }

    #[rstest]
    #[case(f64::NAN, 0.0)]
    #[case(90.5, 0.0)]
    #[case(0.0, -180.5)]
    #[case(0.0, f64::INFINITY)]
    fn out_of_range_coordinates_are_rejected(#[case] lat: f64, #[case] lng: f64) {
        assert!(Coordinate::new(lat, lng).is_err());
    }

    #[test]
    fn margin_widens_the_boundary() {
        let center = coord(0.0, 0.0);
        let point = coord(0.0, 0.01);
        let distance = distance_meters(center, point);

        assert!(is_within(point, center, distance, 1.0));
        assert!(!is_within(point, center, distance / 1.2, 1.1));
        assert!(is_within(point, center, distance / 1.05, 1.1));
    }
}
