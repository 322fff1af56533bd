//! Geographic primitives: coordinates and great-circle distance.
//!
//! Distances use the haversine formula on a mean-radius sphere, which is
//! accurate to ~0.5% — plenty for sorting settlements and pacing a survey.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

const DEG: f64 = PI / 180.0;

/// IUGG mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A WGS84 point. Immutable once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting NaN/infinite values and out-of-range
    /// latitudes/longitudes.
    pub fn new(lat: f64, lon: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !lon.is_finite() || !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon)
        {
            return Err(GeoError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// Errors from coordinate validation.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoError {
    InvalidCoordinate { lat: f64, lon: f64 },
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCoordinate { lat, lon } => {
                write!(f, "Invalid coordinate: lat={}, lon={}", lat, lon)
            }
        }
    }
}

impl std::error::Error for GeoError {}

/// Great-circle distance between two points in kilometres.
///
/// Deterministic and symmetric: `distance_km(a, b) == distance_km(b, a)`.
/// Fails only on malformed numeric input.
pub fn distance_km(a: Coordinate, b: Coordinate) -> Result<f64, GeoError> {
    // Re-validate: callers may have built the struct directly from raw data.
    let a = Coordinate::new(a.lat, a.lon)?;
    let b = Coordinate::new(b.lat, b.lon)?;

    let dlat = (b.lat - a.lat) * DEG;
    let dlon = (b.lon - a.lon) * DEG;

    let h = (dlat / 2.0).sin().powi(2)
        + (a.lat * DEG).cos() * (b.lat * DEG).cos() * (dlon / 2.0).sin().powi(2);

    Ok(2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin())
}
