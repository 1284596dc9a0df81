//! Address lookup against a Nominatim-compatible geocoding service

use crate::{
    core::{config::GeocoderConfig, constants::REVERSE_GEOCODE_ZOOM, geo::LatLng},
    MapError, Result,
};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

/// A location offered for a search query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeCandidate {
    pub label: String,
    pub lat: f64,
    pub lng: f64,
}

impl GeocodeCandidate {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidate locations for free text, in service order.
    async fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>>;

    /// Display name of the place at `position`.
    async fn reverse_geocode(&self, position: LatLng) -> Result<String>;
}

/// Nominatim returns coordinates as strings.
#[derive(Deserialize)]
struct SearchHit {
    display_name: String,
    lat: serde_json::Value,
    lon: serde_json::Value,
}

#[derive(Deserialize)]
struct ReverseHit {
    display_name: Option<String>,
    error: Option<String>,
}

pub struct GeocodeClient {
    config: GeocoderConfig,
    client: reqwest::Client,
}

impl GeocodeClient {
    pub fn new(config: GeocoderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }

    async fn get(&self, url: Url) -> Result<String> {
        log::debug!("Geocoding request: {}", url);
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        check_status(response.status(), &url)?;
        Ok(response.text().await?)
    }
}

/// Any non-success answer from the geocoder is an HTTP error.
pub fn check_status(status: StatusCode, url: &Url) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    log::warn!("Geocoder answered {} for {}", status, url);
    Err(MapError::Http {
        status: status.as_u16(),
        url: url.to_string(),
    })
}

fn parse_base(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url)
        .map_err(|e| MapError::Validation(format!("invalid geocoder URL {}: {}", base_url, e)))?;
    if base.cannot_be_a_base() {
        return Err(MapError::Validation(format!(
            "geocoder URL {} cannot be a base",
            base_url
        )));
    }
    // drop a trailing empty segment so pushes don't produce `//`
    if let Ok(mut segments) = base.path_segments_mut() {
        segments.pop_if_empty();
    }
    Ok(base)
}

/// `{base}/search/{query}?format=json`, with the query percent-encoded as a
/// single path segment.
pub fn search_url(base_url: &str, query: &str) -> Result<Url> {
    let mut url = parse_base(base_url)?;
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push("search").push(query);
    }
    url.set_query(Some("format=json"));
    Ok(url)
}

/// Reverse lookup URL for `position`, rounded to five decimals.
pub fn reverse_url(base_url: &str, position: LatLng) -> Result<Url> {
    let position = position.rounded();
    let mut url = parse_base(base_url)?;
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push("reverse");
    }
    url.query_pairs_mut()
        .append_pair("format", "json")
        .append_pair("lat", &position.lat.to_string())
        .append_pair("lon", &position.lng.to_string())
        .append_pair("zoom", &REVERSE_GEOCODE_ZOOM.to_string())
        .append_pair("addressdetails", "1");
    Ok(url)
}

fn coordinate(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::String(text) => text.trim().parse().ok(),
        serde_json::Value::Number(number) => number.as_f64(),
        _ => None,
    }
}

/// Parses a search response. Hits with unreadable coordinates are skipped.
pub fn parse_search_response(body: &str) -> Result<Vec<GeocodeCandidate>> {
    let hits: Vec<SearchHit> = serde_json::from_str(body)?;
    Ok(hits
        .into_iter()
        .filter_map(|hit| match (coordinate(&hit.lat), coordinate(&hit.lon)) {
            (Some(lat), Some(lng)) => Some(GeocodeCandidate {
                label: hit.display_name,
                lat,
                lng,
            }),
            _ => {
                log::warn!("Skipping geocoder hit without coordinates: {}", hit.display_name);
                None
            }
        })
        .collect())
}

pub fn parse_reverse_response(body: &str) -> Result<String> {
    let hit: ReverseHit = serde_json::from_str(body)?;
    match (hit.display_name, hit.error) {
        (Some(name), _) => Ok(name),
        (None, Some(error)) => Err(MapError::Validation(error)),
        (None, None) => Err(MapError::Validation(
            "reverse geocoding returned no display name".to_string(),
        )),
    }
}

#[async_trait]
impl Geocoder for GeocodeClient {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>> {
        let url = search_url(&self.config.base_url, query)?;
        let body = self.get(url).await?;
        let candidates = parse_search_response(&body)?;
        log::debug!("{} candidates for {:?}", candidates.len(), query);
        Ok(candidates)
    }

    async fn reverse_geocode(&self, position: LatLng) -> Result<String> {
        if !position.is_valid() {
            return Err(MapError::InvalidCoordinates(position.to_string()));
        }
        let url = reverse_url(&self.config.base_url, position)?;
        let body = self.get(url).await?;
        parse_reverse_response(&body)
    }
}
