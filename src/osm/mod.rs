//! OpenStreetMap access layer for Grimoire.
//!
//! Provides Nominatim geocoding, Overpass settlement expansion and
//! restaurant queries, and a file-backed geocode cache with TTL.

pub mod cache;
pub mod nominatim;
pub mod overpass;
pub mod types;

pub use cache::GeocodeCache;
pub use types::{
    DiscoveryError, ExpansionError, PlaceType, PointOfInterest, QueryError, ResolutionError,
    ResolvedPlace, Settlement,
};
