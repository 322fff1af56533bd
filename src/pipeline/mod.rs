//! Sequential, rate-limited discovery pipeline.

pub mod pacer;
pub mod run;

pub use pacer::{FixedDelay, NoDelay, Pacer, COURTESY_DELAY};
pub use run::{
    aggregate, DiscoveryConfig, DiscoveryPipeline, DiscoveryRun, HttpOsmSource, OsmSource,
    SettlementFailure, DEFAULT_CITY_RADIUS_KM, DEFAULT_POI_RADIUS_M,
};
