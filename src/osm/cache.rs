//! File-backed geocode cache at ~/.grimoire/cache.json.
//!
//! TTL: 30 days, checked on every lookup. Case-insensitive keys. Injected
//! into the pipeline explicitly rather than living as ambient global state.

use super::types::ResolvedPlace;
use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

const CACHE_TTL_MS: i64 = 30 * 24 * 3600 * 1000;

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    lat: f64,
    lon: f64,
    name: String,
    timestamp: i64,
    #[serde(default)]
    display_name: Option<String>,
}

/// The geocode cache.
pub struct GeocodeCache {
    path: PathBuf,
    entries: HashMap<String, CacheEntry>,
}

impl GeocodeCache {
    /// Load from the default location (~/.grimoire/cache.json).
    pub fn load() -> Self {
        let path = Self::default_path();
        let entries = Self::read_file(&path).unwrap_or_default();
        Self { path, entries }
    }

    /// Load from a specific path (for testing).
    pub fn load_from(path: PathBuf) -> Self {
        let entries = Self::read_file(&path).unwrap_or_default();
        Self { path, entries }
    }

    fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".grimoire")
            .join("cache.json")
    }

    fn read_file(path: &PathBuf) -> Option<HashMap<String, CacheEntry>> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Look up a place name. Returns None if missing, expired, or the stored
    /// coordinate no longer validates.
    pub fn get(&self, query: &str) -> Option<ResolvedPlace> {
        let entry = self.entries.get(&query.trim().to_lowercase())?;

        let now = chrono::Utc::now().timestamp_millis();
        if now - entry.timestamp > CACHE_TTL_MS {
            return None; // expired
        }

        let coordinate = Coordinate::new(entry.lat, entry.lon).ok()?;
        Some(ResolvedPlace {
            name: entry.name.clone(),
            coordinate,
            display_name: entry.display_name.clone(),
        })
    }

    /// Store a resolved place under the query that produced it and persist.
    pub fn put(&mut self, query: &str, place: &ResolvedPlace) {
        let entry = CacheEntry {
            lat: place.coordinate.lat,
            lon: place.coordinate.lon,
            name: place.name.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            display_name: place.display_name.clone(),
        };
        self.entries.insert(query.trim().to_lowercase(), entry);
        self.persist();
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string_pretty(&self.entries) {
            let _ = fs::write(&self.path, json);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
