//! Coordinate primitives and the small amount of vector math the matcher needs.
//!
//! Every point in this crate is stored as `[longitude, latitude]`. Conversion
//! to `[latitude, longitude]` happens only at the rendering boundary via
//! [`Point::to_lat_lng`].

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Length of one degree of latitude, and of longitude at the equator, in meters.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Sphere radius used for great-circle distances, in meters.
///
/// Matches the radius the area selection query uses to turn a metric radius
/// into an angular one, so in-memory and database selection agree.
pub const EARTH_RADIUS_METERS: f64 = 6_378_100.0;

/// A WGS84 position in decimal degrees, longitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    lng: f64,
    lat: f64,
}

impl Point {
    /// Build a validated point.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if either value is not finite or
    /// falls outside `[-180, 180]` / `[-90, 90]`.
    pub fn new(lng: f64, lat: f64) -> Result<Self, CoreError> {
        if !lng.is_finite() || !lat.is_finite() {
            return Err(CoreError::InvalidInput(format!(
                "coordinates must be finite numbers, got [{lng}, {lat}]"
            )));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoreError::InvalidInput(format!(
                "longitude {lng} is outside [-180, 180]"
            )));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoreError::InvalidInput(format!(
                "latitude {lat} is outside [-90, 90]"
            )));
        }
        Ok(Self { lng, lat })
    }

    /// Skips range checks. Only for points derived from already-valid ones,
    /// such as buffer corners that may spill slightly past a pole or the
    /// antimeridian.
    pub(crate) fn unchecked(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    #[must_use]
    pub fn lng(self) -> f64 {
        self.lng
    }

    #[must_use]
    pub fn lat(self) -> f64 {
        self.lat
    }

    /// Parse a `"lng,lat"` string as sent by upload clients.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if the string does not hold exactly
    /// two numbers or the numbers are out of range.
    pub fn parse_lng_lat(raw: &str) -> Result<Self, CoreError> {
        let mut parts = raw.split(',').map(str::trim);
        let (Some(lng), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(CoreError::InvalidInput(format!(
                "expected \"lng,lat\", got {raw:?}"
            )));
        };
        let parse = |s: &str| {
            s.parse::<f64>()
                .map_err(|e| CoreError::InvalidInput(format!("invalid coordinate {s:?}: {e}")))
        };
        Self::new(parse(lng)?, parse(lat)?)
    }

    /// `[latitude, longitude]`, the order map renderers expect.
    #[must_use]
    pub fn to_lat_lng(self) -> [f64; 2] {
        [self.lat, self.lng]
    }
}

impl TryFrom<[f64; 2]> for Point {
    type Error = CoreError;

    fn try_from([lng, lat]: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(lng, lat)
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.lng, p.lat]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lng, self.lat)
    }
}

/// A straight two-point piece of road geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub p1: Point,
    pub p2: Point,
}

impl Segment {
    #[must_use]
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    /// Zero-length segments have no direction and never match anything.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.p1 == self.p2
    }

    pub(crate) fn direction(&self) -> Vector {
        Vector::between(self.p1, self.p2)
    }
}

/// Planar displacement in raw degree space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Vector {
    pub dx: f64,
    pub dy: f64,
}

impl Vector {
    pub fn between(from: Point, to: Point) -> Self {
        Self {
            dx: to.lng - from.lng,
            dy: to.lat - from.lat,
        }
    }

    pub fn length(self) -> f64 {
        self.dx.hypot(self.dy)
    }

    /// Counter-clockwise perpendicular of length `magnitude`.
    ///
    /// Caller guarantees a nonzero vector.
    pub fn normal(self, magnitude: f64) -> Self {
        let len = self.length();
        Self {
            dx: (-self.dy / len) * magnitude,
            dy: (self.dx / len) * magnitude,
        }
    }

    pub fn cross(self, other: Self) -> f64 {
        self.dx * other.dy - self.dy * other.dx
    }
}

pub(crate) fn offset(p: Point, v: Vector, sign: f64) -> Point {
    Point::unchecked(p.lng + sign * v.dx, p.lat + sign * v.dy)
}

/// Convert a metric distance to degrees of longitude near latitude `at_lat`.
///
/// Valid only locally: the correction uses a single latitude.
#[must_use]
pub fn meters_to_degrees(meters: f64, at_lat: f64) -> f64 {
    meters / (METERS_PER_DEGREE * (at_lat * PI / 180.0).cos())
}

/// Great-circle distance between two points in meters.
#[must_use]
pub fn haversine_meters(a: Point, b: Point) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_range_limits() {
        assert!(Point::new(180.0, 90.0).is_ok());
        assert!(Point::new(-180.0, -90.0).is_ok());
    }

    #[test]
    fn new_rejects_out_of_range_latitude() {
        let err = Point::new(10.0, 91.0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(ref m) if m.contains("latitude")));
    }

    #[test]
    fn new_rejects_non_finite() {
        assert!(Point::new(f64::NAN, 0.0).is_err());
        assert!(Point::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn parse_lng_lat_trims_whitespace() {
        let p = Point::parse_lng_lat(" 88.43 , 22.97 ").unwrap();
        assert_eq!(p.lng(), 88.43);
        assert_eq!(p.lat(), 22.97);
    }

    #[test]
    fn deserialized_points_are_range_checked_like_new() {
        let from_json: Result<Point, _> = serde_json::from_str("[500.0, 0.0]");
        assert!(from_json.is_err());
        assert!(Point::try_from([0.0, -90.5]).is_err());
        let p = Point::try_from([-180.0, 90.0]).unwrap();
        assert_eq!((p.lng(), p.lat()), (-180.0, 90.0));
    }

    #[test]
    fn parse_lng_lat_rejects_wrong_arity() {
        assert!(Point::parse_lng_lat("88.43").is_err());
        assert!(Point::parse_lng_lat("1,2,3").is_err());
        assert!(Point::parse_lng_lat("a,b").is_err());
    }

    #[test]
    fn to_lat_lng_swaps_order() {
        let p = Point::new(88.43, 22.97).unwrap();
        assert_eq!(p.to_lat_lng(), [22.97, 88.43]);
    }

    #[test]
    fn serde_uses_lng_lat_array() {
        let p = Point::new(-97.7431, 30.2672).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "[-97.7431,30.2672]");
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn serde_rejects_out_of_range_array() {
        let result: Result<Point, _> = serde_json::from_str("[200.0, 0.0]");
        assert!(result.is_err());
    }

    #[test]
    fn meters_to_degrees_at_equator() {
        let deg = meters_to_degrees(METERS_PER_DEGREE, 0.0);
        assert!((deg - 1.0).abs() < 1e-12);
    }

    #[test]
    fn meters_to_degrees_widens_with_latitude() {
        assert!(meters_to_degrees(50.0, 60.0) > meters_to_degrees(50.0, 10.0));
        let at_60 = meters_to_degrees(50.0, 60.0);
        assert!((at_60 - 2.0 * meters_to_degrees(50.0, 0.0)).abs() < 1e-9);
    }

    #[test]
    fn haversine_zero_for_same_point() {
        let p = Point::new(88.43, 22.97).unwrap();
        assert!(haversine_meters(p, p).abs() < 1e-9);
    }

    #[test]
    fn haversine_one_degree_of_latitude() {
        let a = Point::new(0.0, 0.0).unwrap();
        let b = Point::new(0.0, 1.0).unwrap();
        let expected = EARTH_RADIUS_METERS * PI / 180.0;
        assert!((haversine_meters(a, b) - expected).abs() < 1e-6);
    }

    #[test]
    fn degenerate_segment_detected() {
        let p = Point::new(1.0, 1.0).unwrap();
        assert!(Segment::new(p, p).is_degenerate());
        assert!(!Segment::new(p, Point::new(1.0, 1.001).unwrap()).is_degenerate());
    }

    #[test]
    fn normal_is_perpendicular_with_requested_length() {
        let v = Vector { dx: 3.0, dy: 4.0 };
        let n = v.normal(2.0);
        assert!((n.length() - 2.0).abs() < 1e-12);
        assert!((v.dx * n.dx + v.dy * n.dy).abs() < 1e-12);
    }
}
