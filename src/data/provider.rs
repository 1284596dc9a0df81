//! Typed provider records as served by the marketplace backend
//!
//! The backend keeps the field names its admin forms use, spaces included,
//! so the serde renames below are the wire format.

use crate::core::geo::LatLng;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(rename = "item type")]
    pub item_type: String,
    #[serde(rename = "service")]
    pub service: String,
}

impl Service {
    pub fn new(item_type: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            service: service.into(),
        }
    }

    /// Display type, e.g. `"bike rental"`. Markers are grouped and filtered by it.
    pub fn type_label(&self) -> String {
        format!("{} {}", self.item_type, self.service)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Logistics {
    #[serde(rename = "delivery base location", default)]
    pub delivery_base_location: Option<LatLng>,
    /// Kilometres
    #[serde(
        rename = "delivery radius",
        default,
        deserialize_with = "lenient_number"
    )]
    pub delivery_radius: f64,
    #[serde(rename = "does deliveries", default)]
    pub does_deliveries: bool,
    #[serde(rename = "delivery timetable", default)]
    pub delivery_timetable: Vec<serde_json::Value>,
    #[serde(rename = "allows pickup", alias = "allows pickup ", default)]
    pub allows_pickup: bool,
    #[serde(rename = "travel charge", default, deserialize_with = "lenient_number")]
    pub travel_charge: f64,
    #[serde(rename = "summarized delivery times", default)]
    pub summarized_delivery_times: Vec<serde_json::Value>,
    #[serde(rename = "delivery vehicles", default)]
    pub delivery_vehicles: Vec<serde_json::Value>,
}

impl Logistics {
    /// Delivery radius in meters, truncated to whole kilometres first the way
    /// the backend stores it.
    pub fn delivery_radius_meters(&self) -> f64 {
        self.delivery_radius.trunc() * 1000.0
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Provider {
    #[serde(rename = "providerID")]
    pub provider_id: String,
    #[serde(rename = "trading name", default)]
    pub trading_name: String,
    #[serde(default)]
    pub location: Option<LatLng>,
    #[serde(default)]
    pub logistics: Logistics,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl Provider {
    /// Where the provider's markers and delivery circle are drawn
    pub fn base_location(&self) -> Option<LatLng> {
        self.logistics.delivery_base_location.or(self.location)
    }
}

/// Accepts `50`, `50.5` or `"50"`; anything else becomes zero.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(number) => number.as_f64().unwrap_or(0.0),
        serde_json::Value::String(text) => text.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Body returned by the provider endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderPayload {
    /// Raw provider records
    Records(Vec<Provider>),
    /// Rendered provider cards. The first card may carry the provider list in
    /// a `data-supplierdata` attribute.
    Cards {
        markup: String,
        providers: Option<Vec<Provider>>,
    },
}

impl ProviderPayload {
    /// Interprets a response body according to the mode it was requested in.
    pub fn from_body(body: &str, cards: bool) -> Self {
        if cards {
            let providers = extract_supplier_data(body).map(|data| parse_providers(&data));
            Self::Cards {
                markup: body.to_string(),
                providers,
            }
        } else {
            Self::Records(parse_providers(body))
        }
    }
}

/// Parses a JSON list of providers. Malformed input yields an empty list and
/// malformed entries are skipped.
pub fn parse_providers(raw: &str) -> Vec<Provider> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            log::warn!("Provider payload is not a JSON list: {}", e);
            return Vec::new();
        }
    };

    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Provider>(value) {
            Ok(provider) => Some(provider),
            Err(e) => {
                log::warn!("Skipping malformed provider record: {}", e);
                None
            }
        })
        .collect()
}

/// Pulls the value of the first `data-supplierdata` attribute out of rendered
/// markup and decodes its HTML entities.
pub fn extract_supplier_data(markup: &str) -> Option<String> {
    const ATTRIBUTE: &str = "data-supplierdata";

    let start = markup.to_ascii_lowercase().find(ATTRIBUTE)? + ATTRIBUTE.len();
    let rest = markup[start..].trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();

    let quote = rest.chars().next()?;
    let value = if quote == '"' || quote == '\'' {
        let body = &rest[1..];
        &body[..body.find(quote)?]
    } else {
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '>')
            .unwrap_or(rest.len());
        &rest[..end]
    };

    if value.is_empty() {
        return None;
    }
    Some(decode_entities(value))
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
