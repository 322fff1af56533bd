//! Core types for the OpenStreetMap survey subsystem.

use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// OSM `place` classification for a discovered settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceType {
    City,
    Town,
    Village,
    Unknown,
}

impl PlaceType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "city" => Self::City,
            "town" => Self::Town,
            "village" => Self::Village,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for PlaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::City => write!(f, "city"),
            Self::Town => write!(f, "town"),
            Self::Village => write!(f, "village"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A named place discovered within the expansion radius of the anchor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub name: String,
    pub place_type: PlaceType,
    pub coordinate: Coordinate,
    /// Great-circle distance from the anchor, in kilometres. Non-negative;
    /// exactly 0 for the anchor itself.
    pub distance_km: f64,
}

/// A restaurant entity extracted from one Overpass element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    /// Name of the settlement whose query produced this entry.
    pub source_city: String,
    pub name: String,
    pub cuisine: Option<String>,
    /// Comma-joined non-empty address components, in street / house number /
    /// postcode / city order.
    pub address: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    /// Absent when the raw element carries no point geometry.
    pub coordinate: Option<Coordinate>,
}

/// The place name a run starts from, resolved to a canonical coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedPlace {
    pub name: String,
    pub coordinate: Coordinate,
    /// Full display name reported by the geocoder, when it came from one.
    pub display_name: Option<String>,
}

// ─── Error taxonomy ──────────────────────────────────────────────
//
// Two hard failure types halt a run (anchor resolution, settlement
// expansion); the soft per-settlement QueryError is caught and logged by the
// orchestrator and deliberately has no conversion into DiscoveryError.

/// The central place name could not be geocoded. Fatal.
#[derive(Debug)]
pub enum ResolutionError {
    Network(String),
    NoMatch(String),
    InvalidResponse(String),
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Geocoder network error: {}", msg),
            Self::NoMatch(q) => write!(f, "No coordinates found for '{}'", q),
            Self::InvalidResponse(msg) => write!(f, "Invalid geocoder response: {}", msg),
        }
    }
}

impl std::error::Error for ResolutionError {}

/// The settlement discovery query failed. One query per run, so this is
/// fatal.
#[derive(Debug)]
pub enum ExpansionError {
    Network(String),
    InvalidResponse(String),
}

impl fmt::Display for ExpansionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Settlement query network error: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid settlement response: {}", msg),
        }
    }
}

impl std::error::Error for ExpansionError {}

/// A single settlement's restaurant query failed. Recovered locally: the
/// settlement contributes zero results and the run continues.
#[derive(Debug)]
pub enum QueryError {
    Network(String),
    InvalidResponse(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Restaurant query network error: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid restaurant response: {}", msg),
        }
    }
}

impl std::error::Error for QueryError {}

/// A fatal pipeline failure. Only the two hard error types convert into
/// this; `QueryError` cannot, which keeps the partial-failure policy a
/// compile-time guarantee rather than a call-site convention.
#[derive(Debug)]
pub enum DiscoveryError {
    Resolution(ResolutionError),
    Expansion(ExpansionError),
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolution(e) => write!(f, "{}", e),
            Self::Expansion(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DiscoveryError {}

impl From<ResolutionError> for DiscoveryError {
    fn from(e: ResolutionError) -> Self {
        Self::Resolution(e)
    }
}

impl From<ExpansionError> for DiscoveryError {
    fn from(e: ExpansionError) -> Self {
        Self::Expansion(e)
    }
}
