//! Gateway wire types, parsing, and errors.
//!
//! Nominatim's jsonv2 format has two quirks this module absorbs:
//! search results carry `lat`/`lon` as *strings*, and reverse lookups for
//! unresolvable points (open ocean) return 200 with an `error` field
//! instead of a non-2xx status.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::geo::GeoPoint;

/// Errors from the geocoding gateway.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GatewayError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The gateway answered with a non-success status.
    #[error("HTTP {code} from {url}")]
    Status { code: u16, url: String },

    /// The response body did not parse as the expected JSON shape.
    #[error("malformed gateway response: {0}")]
    Malformed(String),

    /// The configured base URL (or a URL built from it) is not valid.
    #[error("invalid gateway URL: {0}")]
    InvalidUrl(String),
}

/// A human-readable address for a geographic point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    /// Full formatted address line, always present.
    pub display_name: String,
    /// Street or road name.
    pub road: Option<String>,
    /// Suburb, neighbourhood, or city district.
    pub suburb: Option<String>,
    /// City, town, or village.
    pub city: Option<String>,
    /// Country name.
    pub country: Option<String>,
    /// Postal code.
    pub postcode: Option<String>,
}

impl ResolvedAddress {
    /// Creates an address carrying only the formatted line.
    pub fn from_display_name(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            road: None,
            suburb: None,
            city: None,
            country: None,
            postcode: None,
        }
    }

    /// A short label for constrained UI: "road, suburb" when both are
    /// known, otherwise whatever structure exists, otherwise the full
    /// display name.
    pub fn short_label(&self) -> String {
        match (&self.road, &self.suburb) {
            (Some(road), Some(suburb)) => format!("{}, {}", road, suburb),
            (Some(road), None) => road.clone(),
            (None, Some(suburb)) => suburb.clone(),
            (None, None) => self.display_name.clone(),
        }
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// One forward-search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Gateway identifier for the place, usable as a stable list key.
    pub place_id: u64,
    /// Full formatted name of the place.
    pub display_name: String,
    /// Location of the place.
    pub location: GeoPoint,
}

impl fmt::Display for SearchCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display_name, self.location)
    }
}

// =============================================================================
// Wire format
// =============================================================================

/// Raw reverse-geocode response body.
#[derive(Debug, Deserialize)]
struct ReverseBody {
    display_name: Option<String>,
    address: Option<AddressParts>,
    /// Set (with a 200 status) when the point cannot be resolved.
    error: Option<String>,
}

/// The `address` object of a reverse response. Nominatim uses different
/// keys depending on place class; the accessors collapse the synonyms.
#[derive(Debug, Deserialize)]
struct AddressParts {
    road: Option<String>,
    pedestrian: Option<String>,
    suburb: Option<String>,
    neighbourhood: Option<String>,
    city_district: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    country: Option<String>,
    postcode: Option<String>,
}

impl AddressParts {
    fn road(&self) -> Option<String> {
        self.road.clone().or_else(|| self.pedestrian.clone())
    }

    fn suburb(&self) -> Option<String> {
        self.suburb
            .clone()
            .or_else(|| self.neighbourhood.clone())
            .or_else(|| self.city_district.clone())
    }

    fn city(&self) -> Option<String> {
        self.city
            .clone()
            .or_else(|| self.town.clone())
            .or_else(|| self.village.clone())
    }
}

/// One entry of a search response body.
#[derive(Debug, Deserialize)]
struct SearchEntry {
    #[serde(default)]
    place_id: u64,
    display_name: String,
    /// Stringly-typed coordinates, a Nominatim quirk.
    lat: String,
    lon: String,
}

/// Parses a reverse-geocode body.
///
/// Returns `Ok(None)` for the gateway's "unable to geocode" answer; the
/// point simply has no address.
pub(crate) fn parse_reverse_body(body: &str) -> Result<Option<ResolvedAddress>, GatewayError> {
    let parsed: ReverseBody =
        serde_json::from_str(body).map_err(|e| GatewayError::Malformed(e.to_string()))?;

    if let Some(reason) = parsed.error {
        warn!(%reason, "gateway could not resolve point");
        return Ok(None);
    }

    let display_name = parsed
        .display_name
        .ok_or_else(|| GatewayError::Malformed("missing display_name".to_string()))?;

    let mut address = ResolvedAddress::from_display_name(display_name);
    if let Some(parts) = parsed.address {
        address.road = parts.road();
        address.suburb = parts.suburb();
        address.city = parts.city();
        address.country = parts.country.clone();
        address.postcode = parts.postcode.clone();
    }

    Ok(Some(address))
}

/// Parses a forward-search body into candidates.
///
/// Entries with unparseable coordinates are skipped with a warning rather
/// than failing the whole list.
pub(crate) fn parse_search_body(body: &str) -> Result<Vec<SearchCandidate>, GatewayError> {
    let entries: Vec<SearchEntry> =
        serde_json::from_str(body).map_err(|e| GatewayError::Malformed(e.to_string()))?;

    let candidates = entries
        .into_iter()
        .filter_map(|entry| {
            match (entry.lat.parse::<f64>(), entry.lon.parse::<f64>()) {
                (Ok(lat), Ok(lon)) => Some(SearchCandidate {
                    place_id: entry.place_id,
                    display_name: entry.display_name,
                    location: GeoPoint::new(lat, lon),
                }),
                _ => {
                    warn!(
                        display_name = %entry.display_name,
                        lat = %entry.lat,
                        lon = %entry.lon,
                        "skipping candidate with unparseable coordinates"
                    );
                    None
                }
            }
        })
        .collect();

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REVERSE_BODY: &str = r#"{
        "display_name": "25, Chuy Avenue, Bishkek, Kyrgyzstan, 720001",
        "address": {
            "road": "Chuy Avenue",
            "suburb": "Pervomaysky District",
            "city": "Bishkek",
            "country": "Kyrgyzstan",
            "postcode": "720001"
        }
    }"#;

    #[test]
    fn test_parse_reverse_full_address() {
        let address = parse_reverse_body(REVERSE_BODY).unwrap().unwrap();

        assert_eq!(address.display_name, "25, Chuy Avenue, Bishkek, Kyrgyzstan, 720001");
        assert_eq!(address.road.as_deref(), Some("Chuy Avenue"));
        assert_eq!(address.suburb.as_deref(), Some("Pervomaysky District"));
        assert_eq!(address.city.as_deref(), Some("Bishkek"));
        assert_eq!(address.country.as_deref(), Some("Kyrgyzstan"));
        assert_eq!(address.postcode.as_deref(), Some("720001"));
    }

    #[test]
    fn test_parse_reverse_display_name_only() {
        let body = r#"{"display_name": "Somewhere"}"#;
        let address = parse_reverse_body(body).unwrap().unwrap();

        assert_eq!(address.display_name, "Somewhere");
        assert_eq!(address.road, None);
        assert_eq!(address.city, None);
    }

    #[test]
    fn test_parse_reverse_synonym_keys() {
        // town stands in for city, neighbourhood for suburb
        let body = r#"{
            "display_name": "Kara-Balta, Kyrgyzstan",
            "address": {
                "pedestrian": "Central Alley",
                "neighbourhood": "Zheldybaev",
                "town": "Kara-Balta",
                "country": "Kyrgyzstan"
            }
        }"#;
        let address = parse_reverse_body(body).unwrap().unwrap();

        assert_eq!(address.road.as_deref(), Some("Central Alley"));
        assert_eq!(address.suburb.as_deref(), Some("Zheldybaev"));
        assert_eq!(address.city.as_deref(), Some("Kara-Balta"));
    }

    #[test]
    fn test_parse_reverse_unable_to_geocode() {
        let body = r#"{"error": "Unable to geocode"}"#;
        let result = parse_reverse_body(body).unwrap();
        assert_eq!(result, None, "Ocean points resolve to no address");
    }

    #[test]
    fn test_parse_reverse_malformed() {
        assert!(matches!(
            parse_reverse_body("not json"),
            Err(GatewayError::Malformed(_))
        ));
        assert!(matches!(
            parse_reverse_body(r#"{"address": {}}"#),
            Err(GatewayError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_search_entries() {
        let body = r#"[
            {"place_id": 101, "display_name": "Chuy Avenue, Bishkek", "lat": "42.8746", "lon": "74.5698"},
            {"place_id": 102, "display_name": "Chuy Province", "lat": "42.5658", "lon": "74.9982"}
        ]"#;
        let candidates = parse_search_body(body).unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].place_id, 101);
        assert_eq!(candidates[0].display_name, "Chuy Avenue, Bishkek");
        assert!((candidates[0].location.lat - 42.8746).abs() < 1e-9);
        assert!((candidates[1].location.lon - 74.9982).abs() < 1e-9);
    }

    #[test]
    fn test_parse_search_missing_place_id_defaults() {
        let body = r#"[{"display_name": "Unkeyed", "lat": "42.0", "lon": "74.0"}]"#;
        let candidates = parse_search_body(body).unwrap();

        assert_eq!(candidates[0].place_id, 0);
    }

    #[test]
    fn test_parse_search_empty() {
        let candidates = parse_search_body("[]").unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_parse_search_skips_bad_coordinates() {
        let body = r#"[
            {"display_name": "Good", "lat": "42.0", "lon": "74.0"},
            {"display_name": "Bad", "lat": "not-a-number", "lon": "74.0"}
        ]"#;
        let candidates = parse_search_body(body).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].display_name, "Good");
    }

    #[test]
    fn test_short_label_preference() {
        let mut address = ResolvedAddress::from_display_name("Full, Name, Here");
        assert_eq!(address.short_label(), "Full, Name, Here");

        address.suburb = Some("Pervomaysky".to_string());
        assert_eq!(address.short_label(), "Pervomaysky");

        address.road = Some("Chuy Avenue".to_string());
        assert_eq!(address.short_label(), "Chuy Avenue, Pervomaysky");
    }

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Status {
            code: 503,
            url: "https://nominatim.example/reverse".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("reverse"));
    }
}
