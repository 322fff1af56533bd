//! CSV sink for discovery results.
//!
//! Fixed column order: City, Name, Cuisine, Address, Phone, Website,
//! Latitude, Longitude. Missing values get the sentinels the columns have
//! always carried ("Not specified" for cuisine, "N/A" elsewhere). The target
//! file is overwritten; a failed write aborts the run.

use crate::osm::types::PointOfInterest;
use std::fmt;
use std::path::Path;

pub const HEADER: [&str; 8] = [
    "City", "Name", "Cuisine", "Address", "Phone", "Website", "Latitude", "Longitude",
];

const NOT_AVAILABLE: &str = "N/A";
const NO_CUISINE: &str = "Not specified";

/// Output write failure. Fatal; surfaced after all data is computed.
#[derive(Debug)]
pub enum SinkError {
    Write(String),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write(msg) => write!(f, "Output write failed: {}", msg),
        }
    }
}

impl std::error::Error for SinkError {}

impl From<csv::Error> for SinkError {
    fn from(e: csv::Error) -> Self {
        Self::Write(e.to_string())
    }
}

impl From<std::io::Error> for SinkError {
    fn from(e: std::io::Error) -> Self {
        Self::Write(e.to_string())
    }
}

/// Write the aggregate to `path`, one row per restaurant.
pub fn write_csv(path: &Path, restaurants: &[PointOfInterest]) -> Result<(), SinkError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADER)?;

    for poi in restaurants {
        let (lat, lon) = match poi.coordinate {
            Some(c) => (c.lat.to_string(), c.lon.to_string()),
            None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
        };
        writer.write_record([
            poi.source_city.as_str(),
            poi.name.as_str(),
            poi.cuisine.as_deref().unwrap_or(NO_CUISINE),
            poi.address.as_str(),
            poi.phone.as_deref().unwrap_or(NOT_AVAILABLE),
            poi.website.as_deref().unwrap_or(NOT_AVAILABLE),
            lat.as_str(),
            lon.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use tempfile::TempDir;

    fn sample() -> Vec<PointOfInterest> {
        vec![
            PointOfInterest {
                source_city: "Cruz Alta".into(),
                name: "Churrascaria Gaúcha".into(),
                cuisine: Some("barbecue".into()),
                address: "Rua Principal, 100, 98000, Cruz Alta".into(),
                phone: Some("+55 55 1234".into()),
                website: Some("https://example.com".into()),
                coordinate: Some(Coordinate::new(-28.6438, -53.6063).unwrap()),
            },
            PointOfInterest {
                source_city: "Ibirubá".into(),
                name: "Unnamed".into(),
                cuisine: None,
                address: String::new(),
                phone: None,
                website: None,
                coordinate: None,
            },
        ]
    }

    fn read_rows(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .unwrap();
        let header = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        (header, rows)
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let restaurants = sample();

        write_csv(&path, &restaurants).unwrap();
        let (header, rows) = read_rows(&path);

        assert_eq!(header, HEADER);
        assert_eq!(rows.len(), restaurants.len());
        assert_eq!(rows[0][0], "Cruz Alta");
        assert_eq!(rows[0][1], "Churrascaria Gaúcha");
        assert_eq!(rows[0][2], "barbecue");
        assert_eq!(rows[0][3], "Rua Principal, 100, 98000, Cruz Alta");
        assert_eq!(rows[0][4], "+55 55 1234");
        assert_eq!(rows[0][5], "https://example.com");
        assert_eq!(rows[0][6].parse::<f64>().unwrap(), -28.6438);
        assert_eq!(rows[0][7].parse::<f64>().unwrap(), -53.6063);
    }

    #[test]
    fn test_sentinels_for_missing_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(&path, &sample()).unwrap();
        let (_, rows) = read_rows(&path);

        assert_eq!(rows[1][2], "Not specified");
        assert_eq!(rows[1][4], "N/A");
        assert_eq!(rows[1][5], "N/A");
        assert_eq!(rows[1][6], "N/A");
        assert_eq!(rows[1][7], "N/A");
    }

    #[test]
    fn test_empty_run_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(&path, &[]).unwrap();
        let (header, rows) = read_rows(&path);
        assert_eq!(header, HEADER);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_overwrites_existing_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(&path, &sample()).unwrap();
        write_csv(&path, &sample()[..1]).unwrap();

        let (_, rows) = read_rows(&path);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_unwritable_target_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-subdir").join("out.csv");
        assert!(write_csv(&path, &sample()).is_err());
    }
}
