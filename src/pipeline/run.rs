//! The discovery orchestrator.
//!
//! Resolve the anchor, expand to nearby settlements, then survey each
//! settlement's restaurants in ascending-distance order, one request at a
//! time behind the pacer. A failed settlement survey is logged and
//! contributes zero results; the anchor resolution and the expansion query
//! are fatal when they fail.

use super::pacer::Pacer;
use crate::geo::Coordinate;
use crate::osm::cache::GeocodeCache;
use crate::osm::overpass::{self, finalize_settlements, identity_key};
use crate::osm::types::{
    DiscoveryError, ExpansionError, PointOfInterest, QueryError, ResolutionError, ResolvedPlace,
    Settlement,
};
use crate::osm::nominatim;
use serde::Serialize;
use std::collections::HashSet;

/// Default radius for settlement expansion.
pub const DEFAULT_CITY_RADIUS_KM: f64 = 70.0;

/// Default radius for the per-settlement restaurant survey.
pub const DEFAULT_POI_RADIUS_M: f64 = 5000.0;

/// Everything the external services are asked for during a run.
pub trait OsmSource {
    fn geocode(&self, place: &str) -> Result<ResolvedPlace, ResolutionError>;

    /// Settlements within `radius_km` of the anchor, distance-sorted.
    fn settlements(
        &self,
        anchor: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<Settlement>, ExpansionError>;

    fn restaurants(
        &self,
        center: Coordinate,
        radius_m: f64,
        source_city: &str,
    ) -> Result<Vec<PointOfInterest>, QueryError>;
}

/// Production source: Nominatim for geocoding, Overpass for everything else.
pub struct HttpOsmSource;

impl OsmSource for HttpOsmSource {
    fn geocode(&self, place: &str) -> Result<ResolvedPlace, ResolutionError> {
        nominatim::geocode(place)
    }

    fn settlements(
        &self,
        anchor: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<Settlement>, ExpansionError> {
        overpass::expand_settlements(anchor, radius_km)
    }

    fn restaurants(
        &self,
        center: Coordinate,
        radius_m: f64,
        source_city: &str,
    ) -> Result<Vec<PointOfInterest>, QueryError> {
        overpass::query_restaurants(center, radius_m, source_city)
    }
}

/// Parameters of one discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub anchor: String,
    pub city_radius_km: f64,
    pub poi_radius_m: f64,
    pub max_settlements: Option<usize>,
    /// Merge identical restaurants reported by overlapping settlement radii.
    /// Off by default; overlapping radii then report duplicates as-is.
    pub dedup: bool,
}

impl DiscoveryConfig {
    pub fn new(anchor: impl Into<String>) -> Self {
        Self {
            anchor: anchor.into(),
            city_radius_km: DEFAULT_CITY_RADIUS_KM,
            poi_radius_m: DEFAULT_POI_RADIUS_M,
            max_settlements: None,
            dedup: false,
        }
    }
}

/// A settlement whose survey failed and was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementFailure {
    pub settlement: String,
    pub error: String,
}

/// The aggregate of one pipeline execution. Ephemeral: lives until the sink
/// write completes.
#[derive(Debug, Serialize)]
pub struct DiscoveryRun {
    pub anchor: ResolvedPlace,
    pub settlements: Vec<Settlement>,
    pub restaurants: Vec<PointOfInterest>,
    pub failures: Vec<SettlementFailure>,
}

/// Sequential, rate-limited discovery pipeline.
pub struct DiscoveryPipeline<S: OsmSource, P: Pacer> {
    source: S,
    pacer: P,
    cache: GeocodeCache,
}

impl<S: OsmSource, P: Pacer> DiscoveryPipeline<S, P> {
    pub fn new(source: S, pacer: P, cache: GeocodeCache) -> Self {
        Self { source, pacer, cache }
    }

    /// Execute a full discovery run.
    pub fn run(&mut self, config: &DiscoveryConfig) -> Result<DiscoveryRun, DiscoveryError> {
        let query = config.anchor.trim();
        eprintln!("\u{1F4CD} Starting search from central city: {}", query);

        let anchor = self.resolve_anchor(query)?;
        eprintln!("  Center coordinates: {}", anchor.coordinate);

        self.pacer.pace();
        let discovered = self
            .source
            .settlements(anchor.coordinate, config.city_radius_km)?;
        eprintln!("  Found {} nearby cities/towns", discovered.len());

        let settlements = finalize_settlements(
            discovered,
            &anchor.name,
            anchor.coordinate,
            config.max_settlements,
        );
        if let Some(n) = config.max_settlements {
            eprintln!("  Limited to the {} closest", n.min(settlements.len()));
        }

        let total = settlements.len();
        let mut batches: Vec<Vec<PointOfInterest>> = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (i, settlement) in settlements.iter().enumerate() {
            eprintln!(
                "\u{1F3D9} [{}/{}] Searching in {} ({}, {:.2} km away)",
                i + 1,
                total,
                settlement.name,
                settlement.place_type,
                settlement.distance_km,
            );

            self.pacer.pace();
            match self
                .source
                .restaurants(settlement.coordinate, config.poi_radius_m, &settlement.name)
            {
                Ok(found) => {
                    eprintln!("  \u{2705} Found {} restaurants in {}", found.len(), settlement.name);
                    batches.push(found);
                }
                Err(e) => {
                    // One bad settlement never aborts the batch.
                    eprintln!("  \u{274C} Error searching {}: {}", settlement.name, e);
                    failures.push(SettlementFailure {
                        settlement: settlement.name.clone(),
                        error: e.to_string(),
                    });
                    batches.push(Vec::new());
                }
            }
        }

        let restaurants = aggregate(batches, config.dedup);
        Ok(DiscoveryRun { anchor, settlements, restaurants, failures })
    }

    fn resolve_anchor(&mut self, query: &str) -> Result<ResolvedPlace, ResolutionError> {
        if let Some(cached) = self.cache.get(query) {
            return Ok(cached);
        }
        self.pacer.pace();
        let place = self.source.geocode(query)?;
        self.cache.put(query, &place);
        Ok(place)
    }
}

/// Concatenate per-settlement batches, preserving settlement order and
/// within-settlement source order.
///
/// With `dedup` on, repeats of the same restaurant (lowercased name plus
/// rounded coordinate) from overlapping radii collapse to their first
/// occurrence; entries without a coordinate are never merged.
pub fn aggregate(batches: Vec<Vec<PointOfInterest>>, dedup: bool) -> Vec<PointOfInterest> {
    let mut seen: HashSet<(String, i64, i64)> = HashSet::new();
    let mut out = Vec::new();

    for batch in batches {
        for poi in batch {
            if dedup {
                if let Some(coordinate) = poi.coordinate {
                    if !seen.insert(identity_key(&poi.name, coordinate)) {
                        continue;
                    }
                }
            }
            out.push(poi);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osm::types::PlaceType;
    use crate::pipeline::pacer::NoDelay;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn poi(city: &str, name: &str, lat: f64, lon: f64) -> PointOfInterest {
        PointOfInterest {
            source_city: city.into(),
            name: name.into(),
            cuisine: None,
            address: String::new(),
            phone: None,
            website: None,
            coordinate: Some(coord(lat, lon)),
        }
    }

    /// Fixture source: a fixed settlement field around the anchor, radius
    /// filtering, and per-settlement restaurant outcomes.
    struct MockSource {
        anchor_name: &'static str,
        anchor_coord: Coordinate,
        // (name, distance_km); coordinates derived from distance
        field: Vec<(&'static str, f64)>,
        failing: Vec<&'static str>,
        calls: Rc<Cell<usize>>,
    }

    impl MockSource {
        fn new() -> Self {
            Self {
                anchor_name: "Springfield",
                anchor_coord: coord(40.0, -89.0),
                field: vec![("Shelbyville", 8.0), ("Ogdenville", 25.0), ("North Haverbrook", 60.0)],
                failing: Vec::new(),
                calls: Rc::new(Cell::new(0)),
            }
        }

        fn settlement(&self, name: &str, distance_km: f64) -> Settlement {
            // Offset north by distance; 1 degree latitude ~ 111.2 km.
            let lat = self.anchor_coord.lat + distance_km / 111.2;
            Settlement {
                name: name.to_string(),
                place_type: PlaceType::Town,
                coordinate: coord(lat, self.anchor_coord.lon),
                distance_km,
            }
        }
    }

    impl OsmSource for MockSource {
        fn geocode(&self, place: &str) -> Result<ResolvedPlace, ResolutionError> {
            self.calls.set(self.calls.get() + 1);
            if place == self.anchor_name {
                Ok(ResolvedPlace {
                    name: place.to_string(),
                    coordinate: self.anchor_coord,
                    display_name: None,
                })
            } else {
                Err(ResolutionError::NoMatch(place.to_string()))
            }
        }

        fn settlements(
            &self,
            _anchor: Coordinate,
            radius_km: f64,
        ) -> Result<Vec<Settlement>, ExpansionError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self
                .field
                .iter()
                .filter(|(_, d)| *d <= radius_km)
                .map(|(name, d)| self.settlement(name, *d))
                .collect())
        }

        fn restaurants(
            &self,
            _center: Coordinate,
            _radius_m: f64,
            source_city: &str,
        ) -> Result<Vec<PointOfInterest>, QueryError> {
            self.calls.set(self.calls.get() + 1);
            if self.failing.contains(&source_city) {
                return Err(QueryError::Network("connection reset".into()));
            }
            Ok(vec![
                poi(source_city, &format!("{} Diner", source_city), 40.0, -89.0),
                poi(source_city, &format!("{} Grill", source_city), 40.1, -89.1),
            ])
        }
    }

    fn pipeline(source: MockSource) -> (DiscoveryPipeline<MockSource, NoDelay>, TempDir) {
        let dir = TempDir::new().unwrap();
        let cache = GeocodeCache::load_from(dir.path().join("cache.json"));
        (DiscoveryPipeline::new(source, NoDelay, cache), dir)
    }

    #[test]
    fn test_full_run_orders_and_aggregates() {
        let (mut pipe, _dir) = pipeline(MockSource::new());
        let run = pipe.run(&DiscoveryConfig::new("Springfield")).unwrap();

        // Anchor synthesized at distance 0, then the field in distance order.
        assert_eq!(run.settlements[0].name, "Springfield");
        assert_eq!(run.settlements[0].distance_km, 0.0);
        let names: Vec<_> = run.settlements.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Springfield", "Shelbyville", "Ogdenville", "North Haverbrook"]);
        for pair in run.settlements.windows(2) {
            assert!(pair[0].distance_km <= pair[1].distance_km);
        }

        // Two restaurants per settlement, settlement order preserved.
        assert_eq!(run.restaurants.len(), 8);
        assert_eq!(run.restaurants[0].source_city, "Springfield");
        assert_eq!(run.restaurants[2].source_city, "Shelbyville");
        assert!(run.failures.is_empty());

        // Every source_city references a settlement that was queried.
        for r in &run.restaurants {
            assert!(run.settlements.iter().any(|s| s.name == r.source_city));
        }
    }

    #[test]
    fn test_middle_settlement_failure_is_isolated() {
        let mut source = MockSource::new();
        source.field = vec![("Alpha", 5.0), ("Beta", 10.0), ("Gamma", 15.0)];
        source.failing = vec!["Beta"];
        let (mut pipe, _dir) = pipeline(source);

        let run = pipe.run(&DiscoveryConfig::new("Springfield")).unwrap();

        assert_eq!(run.failures.len(), 1);
        assert_eq!(run.failures[0].settlement, "Beta");
        let cities: Vec<_> = run.restaurants.iter().map(|r| r.source_city.as_str()).collect();
        assert!(cities.contains(&"Alpha"));
        assert!(cities.contains(&"Gamma"));
        assert!(!cities.contains(&"Beta"));
    }

    #[test]
    fn test_unresolvable_anchor_is_fatal() {
        let (mut pipe, _dir) = pipeline(MockSource::new());
        let err = pipe.run(&DiscoveryConfig::new("Atlantis")).unwrap_err();
        assert!(matches!(err, DiscoveryError::Resolution(_)));
    }

    #[test]
    fn test_max_settlements_cap() {
        let (mut pipe, _dir) = pipeline(MockSource::new());
        let mut config = DiscoveryConfig::new("Springfield");
        config.max_settlements = Some(2);

        let run = pipe.run(&config).unwrap();
        // Exactly the anchor plus its nearest neighbour.
        assert_eq!(run.settlements.len(), 2);
        assert_eq!(run.settlements[0].name, "Springfield");
        assert_eq!(run.settlements[1].name, "Shelbyville");
        assert_eq!(run.restaurants.len(), 4);
    }

    #[test]
    fn test_radius_monotonicity() {
        let source_small = MockSource::new();
        let source_big = MockSource::new();

        let names = |radius: f64, source: MockSource| {
            let (mut pipe, _dir) = pipeline(source);
            let mut config = DiscoveryConfig::new("Springfield");
            config.city_radius_km = radius;
            let run = pipe.run(&config).unwrap();
            run.settlements
                .iter()
                .map(|s| s.name.clone())
                .collect::<Vec<_>>()
        };

        let small = names(10.0, source_small);
        let big = names(70.0, source_big);
        for name in &small {
            assert!(big.contains(name), "'{}' missing from wider radius", name);
        }
        assert!(big.len() > small.len());
    }

    #[test]
    fn test_empty_expansion_still_processes_anchor() {
        let mut source = MockSource::new();
        source.field = Vec::new();
        let (mut pipe, _dir) = pipeline(source);

        let run = pipe.run(&DiscoveryConfig::new("Springfield")).unwrap();
        assert_eq!(run.settlements.len(), 1);
        assert_eq!(run.settlements[0].name, "Springfield");
        assert_eq!(run.restaurants.len(), 2);
    }

    #[test]
    fn test_every_external_call_is_paced() {
        struct CountingPacer(Rc<Cell<usize>>);
        impl Pacer for CountingPacer {
            fn pace(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let source = MockSource::new();
        let paces = Rc::new(Cell::new(0));
        let dir = TempDir::new().unwrap();
        let cache = GeocodeCache::load_from(dir.path().join("cache.json"));
        let mut pipe =
            DiscoveryPipeline::new(source, CountingPacer(Rc::clone(&paces)), cache);

        let run = pipe.run(&DiscoveryConfig::new("Springfield")).unwrap();
        // geocode + expansion + one per settlement.
        assert_eq!(paces.get(), 2 + run.settlements.len());
    }

    #[test]
    fn test_cached_anchor_skips_geocoding() {
        let source = MockSource::new();
        let calls = Rc::clone(&source.calls);
        let dir = TempDir::new().unwrap();
        let mut cache = GeocodeCache::load_from(dir.path().join("cache.json"));
        cache.put(
            "Springfield",
            &ResolvedPlace {
                name: "Springfield".into(),
                coordinate: coord(40.0, -89.0),
                display_name: None,
            },
        );

        let mut pipe = DiscoveryPipeline::new(source, NoDelay, cache);
        pipe.run(&DiscoveryConfig::new("Springfield")).unwrap();
        // 1 expansion + 4 settlement surveys; no geocode call.
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn test_aggregate_no_dedup_keeps_duplicates() {
        let duplicate = poi("A", "Same Place", 10.0, 20.0);
        let batches = vec![vec![duplicate.clone()], vec![duplicate.clone()]];
        assert_eq!(aggregate(batches, false).len(), 2);
    }

    #[test]
    fn test_aggregate_dedup_merges_by_identity() {
        let first = poi("A", "Same Place", 10.0, 20.0);
        let mut second = poi("B", "same place", 10.000002, 20.000002);
        second.phone = Some("+1".into());
        let other = poi("B", "Other Place", 11.0, 20.0);

        let merged = aggregate(vec![vec![first.clone()], vec![second, other]], true);
        assert_eq!(merged.len(), 2);
        // First occurrence wins.
        assert_eq!(merged[0].source_city, "A");
        assert!(merged[0].phone.is_none());
    }

    #[test]
    fn test_aggregate_dedup_spares_coordinate_less_entries() {
        let mut a = poi("A", "Unnamed", 0.0, 0.0);
        a.coordinate = None;
        let mut b = poi("B", "Unnamed", 0.0, 0.0);
        b.coordinate = None;
        assert_eq!(aggregate(vec![vec![a], vec![b]], true).len(), 2);
    }
}
