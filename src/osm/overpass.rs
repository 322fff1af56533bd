//! Overpass API queries: settlement expansion and restaurant surveys.
//!
//! Queries are radius-bounded tag filters around a coordinate, POSTed to the
//! public interpreter as the `data` form field. Elements come back either as
//! nodes (direct lat/lon) or as ways/relations whose representative point
//! sits under a `center` field; elements with neither are excluded.

use super::nominatim::USER_AGENT;
use super::types::{ExpansionError, PlaceType, PointOfInterest, QueryError, Settlement};
use crate::geo::{distance_km, Coordinate};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Sentinel for restaurants the source leaves unnamed.
pub const UNNAMED: &str = "Unnamed";

// ─── Response model ──────────────────────────────────────────────

#[derive(Deserialize, Debug)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

#[derive(Deserialize, Debug, Default)]
pub struct OverpassElement {
    #[serde(default)]
    pub tags: HashMap<String, String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<CenterPoint>,
}

#[derive(Deserialize, Debug)]
pub struct CenterPoint {
    pub lat: f64,
    pub lon: f64,
}

impl OverpassElement {
    /// Representative point: node geometry directly, or the area centroid.
    fn point(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => self.center.as_ref().map(|c| (c.lat, c.lon)),
        }
    }

    fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

// ─── Query builders ──────────────────────────────────────────────

/// Overpass QL for all settlement-type places within `radius_km` of a point.
pub fn settlement_query(center: Coordinate, radius_km: f64) -> String {
    let radius_m = radius_km * 1000.0;
    format!(
        "[out:json][timeout:60];\n\
         (\n\
           node[\"place\"~\"city|town|village\"](around:{radius},{lat},{lon});\n\
           relation[\"place\"~\"city|town|village\"](around:{radius},{lat},{lon});\n\
         );\n\
         out center;",
        radius = radius_m,
        lat = center.lat,
        lon = center.lon,
    )
}

/// Overpass QL for restaurant nodes within `radius_m` of a point.
pub fn restaurant_query(center: Coordinate, radius_m: f64) -> String {
    format!(
        "[out:json][timeout:25];\n\
         (\n\
           node[\"amenity\"=\"restaurant\"](around:{radius},{lat},{lon});\n\
         );\n\
         out body;",
        radius = radius_m,
        lat = center.lat,
        lon = center.lon,
    )
}

// ─── HTTP ────────────────────────────────────────────────────────

fn post_query(query: &str) -> Result<ureq::Response, String> {
    ureq::post(OVERPASS_URL)
        .set("User-Agent", USER_AGENT)
        .send_form(&[("data", query)])
        .map_err(|e| e.to_string())
}

/// Discover settlements within `radius_km` of the anchor, sorted by distance.
///
/// One query per run; failure here aborts the whole run.
pub fn expand_settlements(
    anchor: Coordinate,
    radius_km: f64,
) -> Result<Vec<Settlement>, ExpansionError> {
    let response = post_query(&settlement_query(anchor, radius_km))
        .map_err(ExpansionError::Network)?;
    let parsed: OverpassResponse = response
        .into_json()
        .map_err(|e| ExpansionError::InvalidResponse(e.to_string()))?;
    Ok(parse_settlements(&parsed, anchor))
}

/// Survey restaurants around one settlement.
///
/// Scoped to a single settlement; the caller recovers from failure.
pub fn query_restaurants(
    center: Coordinate,
    radius_m: f64,
    source_city: &str,
) -> Result<Vec<PointOfInterest>, QueryError> {
    let response = post_query(&restaurant_query(center, radius_m))
        .map_err(QueryError::Network)?;
    let parsed: OverpassResponse = response
        .into_json()
        .map_err(|e| QueryError::InvalidResponse(e.to_string()))?;
    Ok(parse_restaurants(&parsed, source_city))
}

// ─── Settlement extraction ───────────────────────────────────────

/// Map raw elements to settlements: resolve the representative point, compute
/// the distance from the anchor, dedup by name + coordinate, sort ascending.
///
/// Elements without geometry are excluded per the service contract; elements
/// with malformed coordinates are skipped with a warning rather than aborting
/// the expansion.
pub fn parse_settlements(response: &OverpassResponse, anchor: Coordinate) -> Vec<Settlement> {
    let mut seen: HashSet<(String, i64, i64)> = HashSet::new();
    let mut settlements = Vec::new();

    for element in &response.elements {
        let Some((lat, lon)) = element.point() else {
            continue;
        };

        let name = element.tag("name").unwrap_or(UNNAMED).to_string();

        let coordinate = match Coordinate::new(lat, lon) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("  \u{26A0} Skipping '{}': {}", name, e);
                continue;
            }
        };

        let distance = match distance_km(anchor, coordinate) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("  \u{26A0} Skipping '{}': {}", name, e);
                continue;
            }
        };

        if !seen.insert(identity_key(&name, coordinate)) {
            continue;
        }

        settlements.push(Settlement {
            name,
            place_type: PlaceType::from_tag(element.tag("place").unwrap_or("")),
            coordinate,
            distance_km: distance,
        });
    }

    settlements.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    settlements
}

/// Guarantee the anchor's presence, then apply the optional cap.
///
/// If no discovered settlement matches the anchor name (case-insensitive), a
/// synthetic entry with distance 0 is prepended, so the anchor is processed
/// even when the expansion returns nothing. The cap truncates after that:
/// `max = 2` means the anchor plus its nearest neighbour.
pub fn finalize_settlements(
    mut settlements: Vec<Settlement>,
    anchor_name: &str,
    anchor: Coordinate,
    max: Option<usize>,
) -> Vec<Settlement> {
    let anchor_present = settlements
        .iter()
        .any(|s| s.name.eq_ignore_ascii_case(anchor_name));

    if !anchor_present {
        settlements.insert(
            0,
            Settlement {
                name: anchor_name.to_string(),
                place_type: PlaceType::City,
                coordinate: anchor,
                distance_km: 0.0,
            },
        );
    }

    if let Some(n) = max {
        settlements.truncate(n);
    }
    settlements
}

// ─── Restaurant extraction ───────────────────────────────────────

/// Map raw elements to restaurant records for one settlement.
pub fn parse_restaurants(response: &OverpassResponse, source_city: &str) -> Vec<PointOfInterest> {
    response
        .elements
        .iter()
        .map(|element| {
            let coordinate = element
                .point()
                .and_then(|(lat, lon)| Coordinate::new(lat, lon).ok());

            // contact:phone wins over plain phone.
            let phone = element
                .tag("contact:phone")
                .or_else(|| element.tag("phone"))
                .map(str::to_string);

            PointOfInterest {
                source_city: source_city.to_string(),
                name: element.tag("name").unwrap_or(UNNAMED).to_string(),
                cuisine: element.tag("cuisine").map(str::to_string),
                address: build_address(element),
                phone,
                website: element.tag("website").map(str::to_string),
                coordinate,
            }
        })
        .collect()
}

/// Join the non-empty address tags in street / house number / postcode / city
/// order.
fn build_address(element: &OverpassElement) -> String {
    ["addr:street", "addr:housenumber", "addr:postcode", "addr:city"]
        .iter()
        .filter_map(|key| element.tag(key))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Stable identity for dedup: lowercased name plus coordinate rounded to
/// 1e-5 degrees (~1 m).
pub fn identity_key(name: &str, coordinate: Coordinate) -> (String, i64, i64) {
    (
        name.to_lowercase(),
        (coordinate.lat * 1e5).round() as i64,
        (coordinate.lon * 1e5).round() as i64,
    )
}
