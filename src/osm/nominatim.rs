//! Nominatim geocoding: free-text place name → canonical coordinate.
//!
//! The first-ranked result is authoritative; no fuzzy disambiguation. Zero
//! results or a non-success status is a `ResolutionError`.

use super::types::{ResolutionError, ResolvedPlace};
use crate::geo::Coordinate;
use serde::Deserialize;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

pub(crate) const USER_AGENT: &str = "GrimoireOSM/0.2 (regional-restaurant-survey)";

/// One entry of a Nominatim `format=json` response. Latitude and longitude
/// arrive as numeric strings.
#[derive(Deserialize, Debug, Clone)]
pub struct NominatimResult {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

/// Geocode a place name, taking the service's top-ranked match.
pub fn geocode(query: &str) -> Result<ResolvedPlace, ResolutionError> {
    let url = format!(
        "{}?q={}&format=json&limit=1",
        NOMINATIM_URL,
        urlencode(query),
    );

    let response = ureq::get(&url)
        .set("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| ResolutionError::Network(e.to_string()))?;

    let results: Vec<NominatimResult> = response
        .into_json()
        .map_err(|e| ResolutionError::InvalidResponse(e.to_string()))?;

    first_match(query, &results)
}

/// Select the first-ranked result and parse its coordinate.
pub fn first_match(query: &str, results: &[NominatimResult]) -> Result<ResolvedPlace, ResolutionError> {
    let top = results
        .first()
        .ok_or_else(|| ResolutionError::NoMatch(query.to_string()))?;

    let lat: f64 = top
        .lat
        .parse()
        .map_err(|_| ResolutionError::InvalidResponse(format!("bad latitude '{}'", top.lat)))?;
    let lon: f64 = top
        .lon
        .parse()
        .map_err(|_| ResolutionError::InvalidResponse(format!("bad longitude '{}'", top.lon)))?;

    let coordinate = Coordinate::new(lat, lon)
        .map_err(|e| ResolutionError::InvalidResponse(e.to_string()))?;

    Ok(ResolvedPlace {
        name: query.trim().to_string(),
        coordinate,
        display_name: Some(top.display_name.clone()),
    })
}

/// Minimal percent-encoding for the query parameter, no extra dep.
pub(crate) fn urlencode(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            ' ' => "%20".to_string(),
            '&' => "%26".to_string(),
            '=' => "%3D".to_string(),
            '+' => "%2B".to_string(),
            ',' => "%2C".to_string(),
            _ if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '~' => {
                c.to_string()
            }
            _ => {
                let mut buf = [0u8; 4];
                c.encode_utf8(&mut buf)
                    .bytes()
                    .map(|b| format!("%{:02X}", b))
                    .collect()
            }
        })
        .collect()
}
