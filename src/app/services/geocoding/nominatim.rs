//! Nominatim (OpenStreetMap) geocoding provider

use super::{GeocodeError, Geocoder};
use crate::app::models::Coordinates;
use crate::config::GeocoderConfig;
use crate::{Error, Result};
use serde::Deserialize;
use std::time::Duration;
use ureq::{Agent, AgentBuilder};

/// Free-form search against a Nominatim-compatible `/search` endpoint
pub struct NominatimGeocoder {
    agent: Agent,
    search_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::geocoding(format!(
                "Nominatim URL must be http(s): '{}'",
                config.base_url
            )));
        }

        let agent = AgentBuilder::new()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build();

        Ok(Self {
            agent,
            search_url: format!("{}/search", base_url),
        })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(
        &self,
        query: &str,
        timeout: Duration,
    ) -> std::result::Result<Option<Coordinates>, GeocodeError> {
        let places: Vec<Place> = self
            .agent
            .get(&self.search_url)
            .timeout(timeout)
            .query("q", query)
            .query("format", "json")
            .query("limit", "1")
            .call()?
            .into_json()
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        first_coordinates(places)
    }
}

/// Search hit; Nominatim sends coordinates as strings
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

fn first_coordinates(
    places: Vec<Place>,
) -> std::result::Result<Option<Coordinates>, GeocodeError> {
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let parse = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|e| GeocodeError::InvalidResponse(format!("bad coordinate '{}': {}", value, e)))
    };
    let lat = parse(&place.lat)?;
    let lon = parse(&place.lon)?;

    Coordinates::from_parts(Some(lat), Some(lon))
        .map(Some)
        .ok_or_else(|| GeocodeError::InvalidResponse(format!("non-finite coordinates {lat}, {lon}")))
}

impl From<ureq::Error> for GeocodeError {
    fn from(error: ureq::Error) -> Self {
        match error {
            ureq::Error::Status(status, response) => GeocodeError::Http {
                status,
                message: response.status_text().to_string(),
            },
            ureq::Error::Transport(transport) => GeocodeError::Transport(transport.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn places(json: &str) -> Vec<Place> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_first_result_is_used() {
        let response = places(
            r#"[
                {"place_id": 1, "lat": "-0.1806532", "lon": "-78.4678382", "display_name": "Iñaquito, Quito"},
                {"place_id": 2, "lat": "1.0", "lon": "2.0", "display_name": "elsewhere"}
            ]"#,
        );

        let coordinates = first_coordinates(response).unwrap().unwrap();
        assert_eq!(coordinates, Coordinates::new(-0.1806532, -78.4678382));
    }

    #[test]
    fn test_empty_response_is_no_match() {
        assert!(first_coordinates(places("[]")).unwrap().is_none());
    }

    #[test]
    fn test_bad_coordinate_is_invalid_response() {
        let response = places(r#"[{"lat": "north", "lon": "-78.4"}]"#);
        assert!(matches!(
            first_coordinates(response),
            Err(GeocodeError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_search_url() {
        let config = GeocoderConfig {
            base_url: "https://nominatim.example.org/".to_string(),
            ..GeocoderConfig::default()
        };
        let geocoder = NominatimGeocoder::new(&config).unwrap();
        assert_eq!(geocoder.search_url(), "https://nominatim.example.org/search");
    }

    #[test]
    fn test_rejects_non_http_url() {
        let config = GeocoderConfig {
            base_url: "nominatim.example.org".to_string(),
            ..GeocoderConfig::default()
        };
        assert!(NominatimGeocoder::new(&config).is_err());
    }
}
