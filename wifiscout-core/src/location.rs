//! Validated WGS84 positions and the distance metrics used by the engine.
//!
//! Positions wrap a [`geo::Point`] with `x = longitude` and `y = latitude`,
//! matching the axis order used throughout the `geo` ecosystem. Two metrics
//! are offered:
//!
//! - [`GeoPoint::haversine_distance`] returns the great-circle distance in
//!   meters and is used for every distance that is reported or compared
//!   against a radius.
//! - [`GeoPoint::degree_manhattan_distance`] returns `|Δlat| + |Δlon|` in
//!   degrees. It is only a ranking key for picking the single nearest access
//!   point and can disagree with the great-circle ordering away from the
//!   equator.
//!
//! # Examples
//! ```
//! use wifiscout_core::GeoPoint;
//!
//! let origin = GeoPoint::new(0.0, 0.0).expect("valid origin");
//! let east = GeoPoint::new(0.0, 1.0).expect("valid point");
//! let meters = origin.haversine_distance(&east);
//! assert!((meters - 111_195.0).abs() < 1.0);
//! ```

use geo::{Distance, HaversineMeasure, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Earth radius used for great-circle distances, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

const SPHERE: HaversineMeasure = HaversineMeasure::new(EARTH_RADIUS_M);
const HALF_CIRCUMFERENCE_M: f64 = std::f64::consts::PI * EARTH_RADIUS_M;

const MAX_LATITUDE: f64 = 90.0;
const MAX_LONGITUDE: f64 = 180.0;

/// Errors returned by [`GeoPoint::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude was non-finite or outside `[-90, 90]`.
    #[error("latitude {0} must be a finite value between -90 and 90 degrees")]
    Latitude(f64),
    /// Longitude was non-finite or outside `[-180, 180]`.
    #[error("longitude {0} must be a finite value between -180 and 180 degrees")]
    Longitude(f64),
}

/// A validated position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LatLon", into = "LatLon")]
pub struct GeoPoint(Point<f64>);

/// Wire shape of a [`GeoPoint`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct LatLon {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Validate and construct a position.
    ///
    /// # Errors
    /// Returns [`CoordinateError`] when either axis is non-finite or out of
    /// range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-MAX_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self(Point::new(longitude, latitude)))
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.0.y()
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.0.x()
    }

    /// Borrow the position as a `geo` point.
    #[must_use]
    pub const fn as_point(&self) -> &Point<f64> {
        &self.0
    }

    /// Great-circle distance to `other` in meters.
    ///
    /// The result is symmetric and zero for identical positions.
    #[must_use]
    pub fn haversine_distance(&self, other: &Self) -> f64 {
        let meters = SPHERE.distance(self.0, other.0);
        // Rounding can push the haversine term past one for antipodal points.
        if meters.is_nan() {
            HALF_CIRCUMFERENCE_M
        } else {
            meters
        }
    }

    /// Sum of absolute latitude and longitude differences, in degrees.
    #[expect(
        clippy::float_arithmetic,
        reason = "the ranking key is a sum of coordinate differences"
    )]
    #[must_use]
    pub fn degree_manhattan_distance(&self, other: &Self) -> f64 {
        (self.latitude() - other.latitude()).abs() + (self.longitude() - other.longitude()).abs()
    }
}

impl TryFrom<LatLon> for GeoPoint {
    type Error = CoordinateError;

    fn try_from(raw: LatLon) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl From<GeoPoint> for LatLon {
    fn from(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude(),
            longitude: point.longitude(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint::new(latitude, longitude).expect("valid test coordinates")
    }

    #[rstest]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(0.0, 0.0)]
    fn accepts_boundary_coordinates(#[case] latitude: f64, #[case] longitude: f64) {
        assert!(GeoPoint::new(latitude, longitude).is_ok());
    }

    #[rstest]
    #[case(90.000_001, 0.0, CoordinateError::Latitude(90.000_001))]
    #[case(-91.0, 0.0, CoordinateError::Latitude(-91.0))]
    #[case(0.0, 180.5, CoordinateError::Longitude(180.5))]
    #[case(0.0, -181.0, CoordinateError::Longitude(-181.0))]
    fn rejects_out_of_range_coordinates(
        #[case] latitude: f64,
        #[case] longitude: f64,
        #[case] expected: CoordinateError,
    ) {
        assert_eq!(GeoPoint::new(latitude, longitude), Err(expected));
    }

    #[rstest]
    fn rejects_non_finite_coordinates() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[rstest]
    fn distance_to_self_is_zero() {
        let here = point(40.7128, -74.006);
        assert_eq!(here.haversine_distance(&here), 0.0);
    }

    #[rstest]
    #[case(point(40.7128, -74.006), point(40.7150, -74.0075))]
    #[case(point(-33.86, 151.2), point(51.5, -0.12))]
    #[case(point(0.0, 179.9), point(0.0, -179.9))]
    fn distance_is_symmetric(#[case] a: GeoPoint, #[case] b: GeoPoint) {
        let forward = a.haversine_distance(&b);
        let backward = b.haversine_distance(&a);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[rstest]
    fn one_degree_of_longitude_at_the_equator() {
        let meters = point(0.0, 0.0).haversine_distance(&point(0.0, 1.0));
        assert!((meters - 111_195.0).abs() / 111_195.0 < 0.01);
    }

    #[rstest]
    #[case(point(0.0, 0.0), point(0.0, 180.0))]
    #[case(point(45.0, 30.0), point(-45.0, -150.0))]
    #[case(point(90.0, 0.0), point(-90.0, 0.0))]
    fn antipodal_points_are_half_a_circumference_apart(#[case] a: GeoPoint, #[case] b: GeoPoint) {
        let meters = a.haversine_distance(&b);
        assert!((meters - HALF_CIRCUMFERENCE_M).abs() < 1.0);
    }

    #[rstest]
    fn uses_the_configured_earth_radius() {
        // One degree of arc on a 6 371 km sphere.
        let meters = point(0.0, 0.0).haversine_distance(&point(1.0, 0.0));
        let expected = EARTH_RADIUS_M.to_radians();
        assert!((meters - expected).abs() < 1e-6);
    }

    #[rstest]
    fn manhattan_distance_sums_axis_differences() {
        let crude = point(1.0, 2.0).degree_manhattan_distance(&point(1.5, 1.0));
        assert!((crude - 1.5).abs() < 1e-12);
    }

    #[rstest]
    fn serialises_as_named_axes() {
        let json = serde_json::to_value(point(12.5, -3.25)).expect("serialise point");
        assert_eq!(
            json,
            serde_json::json!({ "latitude": 12.5, "longitude": -3.25 })
        );
    }

    #[rstest]
    fn deserialising_validates_ranges() {
        let result: Result<GeoPoint, _> =
            serde_json::from_value(serde_json::json!({ "latitude": 95.0, "longitude": 0.0 }));
        assert!(result.is_err());
    }
}
