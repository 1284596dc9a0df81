use crate::{
    core::geo::LatLng,
    data::provider::Provider,
};
use serde::Serialize;

/// Content bound to a marker popup. Popups never auto-pan the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Popup {
    Text(String),
    Rental(Box<RentalPopup>),
}

impl Popup {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Popup shown on the client marker
    pub fn client_location(position: LatLng) -> Self {
        Self::Text(format!("Your chosen location: {}, {}", position.lat, position.lng))
    }

    /// One-line summary for logs and layer options
    pub fn summary(&self) -> String {
        match self {
            Popup::Text(text) => text.clone(),
            Popup::Rental(rental) => format!("{} - {}", rental.title, rental.subtitle),
        }
    }
}

/// Delivery radius toggle offered by providers that deliver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryRadiusButton {
    pub center: LatLng,
    pub radius_meters: f64,
}

/// Data carried by the "next" button into the booking flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextButton {
    pub page_id: String,
    pub provider_id: String,
    pub logistics: String,
    pub hire_choice: String,
}

/// Popup of a provider service marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentalPopup {
    pub title: String,
    pub subtitle: String,
    pub read_more_url: Option<String>,
    /// The "Check route" button is always offered
    pub route_button: bool,
    pub delivery_radius: Option<DeliveryRadiusButton>,
    pub next: NextButton,
    /// Hidden hint shown when routing is attempted without a client location
    pub alert: String,
    pub alert_visible: bool,
}

impl RentalPopup {
    /// Builds the popup for `provider`'s service at `service_index`. Returns
    /// `None` when the provider has no such service.
    pub fn build(provider: &Provider, service_index: usize, site_origin: &str) -> Option<Self> {
        let service = provider.services.get(service_index)?;

        let delivery_radius = match (provider.logistics.does_deliveries, provider.base_location()) {
            (true, Some(center)) => Some(DeliveryRadiusButton {
                center,
                radius_meters: provider.logistics.delivery_radius_meters(),
            }),
            _ => None,
        };

        Some(Self {
            title: provider.trading_name.clone(),
            subtitle: capitalize(&service.type_label()),
            read_more_url: read_more_url(site_origin, &provider.trading_name),
            route_button: true,
            delivery_radius,
            next: NextButton {
                page_id: "1".to_string(),
                provider_id: provider.provider_id.clone(),
                logistics: serde_json::to_string(&provider.logistics).unwrap_or_default(),
                hire_choice: service.item_type.clone(),
            },
            alert: "Please search for a location to route in the panel above".to_string(),
            alert_visible: false,
        })
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn read_more_url(origin: &str, trading_name: &str) -> Option<String> {
    let mut url = reqwest::Url::parse(origin).ok()?.join("/provider").ok()?;
    url.query_pairs_mut().append_pair("alias", trading_name);
    Some(url.to_string())
}
