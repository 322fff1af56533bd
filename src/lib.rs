//! Grimoire — regional restaurant discovery over OpenStreetMap.
//!
//! Starting from one place name, resolve its coordinate via Nominatim,
//! expand outward to the settlements within a radius via Overpass, survey
//! each settlement's restaurants, and emit one distance-ordered CSV. All
//! external calls are sequential and paced; a failed settlement survey is
//! logged and skipped, while anchor resolution and settlement expansion
//! failures abort the run.

pub mod geo;
pub mod osm;
pub mod pipeline;
pub mod server;
pub mod sink;

pub use geo::{distance_km, Coordinate, GeoError};
pub use osm::{PointOfInterest, ResolvedPlace, Settlement};
pub use pipeline::{DiscoveryConfig, DiscoveryPipeline, DiscoveryRun};
