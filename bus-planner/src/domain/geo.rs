//! Coordinates and the distance provider seam.
//!
//! Everything in the planner measures distance through [`DistanceProvider`],
//! so a caller can plug in a map surface's geodesic distance. [`Haversine`]
//! is the default great-circle implementation.

use std::fmt;

use super::DomainError;

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 coordinate.
///
/// Always finite and within the valid lat/lon ranges. The `(0, 0)` point is
/// rejected: upstream data uses it as a placeholder for "not surveyed".
#[derive(Clone, Copy, PartialEq)]
pub struct Coord {
    lat: f64,
    lon: f64,
}

impl Coord {
    /// Build a coordinate, validating ranges.
    ///
    /// # Examples
    ///
    /// ```
    /// use bus_planner::domain::Coord;
    ///
    /// assert!(Coord::new(-2.9, -79.0).is_ok());
    /// assert!(Coord::new(91.0, 0.0).is_err());
    /// assert!(Coord::new(f64::NAN, 1.0).is_err());
    /// assert!(Coord::new(0.0, 0.0).is_err());
    /// ```
    pub fn new(lat: f64, lon: f64) -> Result<Self, DomainError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(DomainError::InvalidCoordinate("non-finite component"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(DomainError::InvalidCoordinate("latitude out of range"));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(DomainError::InvalidCoordinate("longitude out of range"));
        }
        if lat == 0.0 && lon == 0.0 {
            return Err(DomainError::InvalidCoordinate("null island placeholder"));
        }
        Ok(Self { lat, lon })
    }

    /// Build a coordinate from optional raw parts, yielding `None` when the
    /// record is incomplete or invalid.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        Self::new(lat?, lon?).ok()
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coord({:.6}, {:.6})", self.lat, self.lon)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

/// Point-to-point distance in metres.
///
/// Implementations must be pure: the same pair always yields the same value.
pub trait DistanceProvider: Send + Sync {
    fn distance(&self, a: Coord, b: Coord) -> f64;
}

/// Great-circle distance on a spherical Earth.
#[derive(Debug, Clone, Copy, Default)]
pub struct Haversine;

impl DistanceProvider for Haversine {
    fn distance(&self, a: Coord, b: Coord) -> f64 {
        haversine_m(a, b)
    }
}

impl<F> DistanceProvider for F
where
    F: Fn(Coord, Coord) -> f64 + Send + Sync,
{
    fn distance(&self, a: Coord, b: Coord) -> f64 {
        self(a, b)
    }
}

/// Haversine distance between two coordinates, in metres.
pub fn haversine_m(a: Coord, b: Coord) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}
