use crate::{
    core::{
        constants::{CLIENT_MARKER_Z_OFFSET, PROVIDER_MARKER_Z_OFFSET},
        geo::{LatLng, LatLngBounds},
    },
    layers::base::{point_bounds, LayerProperties, LayerTrait, LayerType},
    ui::popup::Popup,
};

/// How a marker is drawn
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerStyle {
    /// Default pin icon, used for the client location
    Pin,
    /// Canvas circle in a per-service colour, used for providers
    Circle { color: String },
}

pub struct Marker {
    properties: LayerProperties,
    position: LatLng,
    style: MarkerStyle,
    popup: Option<Popup>,
}

impl Marker {
    /// Pin marker for the client's chosen location
    pub fn pin(id: String, position: LatLng) -> Self {
        Self {
            properties: LayerProperties::new(id, LayerType::Marker)
                .with_z_index(CLIENT_MARKER_Z_OFFSET),
            position,
            style: MarkerStyle::Pin,
            popup: None,
        }
    }

    /// Circle marker for a provider service, lifted into the marker pane so
    /// it stays above a drawn route.
    pub fn circle(id: String, position: LatLng, color: String) -> Self {
        Self {
            properties: LayerProperties::new(id, LayerType::CircleMarker)
                .with_z_index(PROVIDER_MARKER_Z_OFFSET),
            position,
            style: MarkerStyle::Circle { color },
            popup: None,
        }
    }

    pub fn with_popup(mut self, popup: Popup) -> Self {
        self.popup = Some(popup);
        self
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn set_position(&mut self, position: LatLng) {
        self.position = position;
    }

    pub fn style(&self) -> &MarkerStyle {
        &self.style
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn set_popup(&mut self, popup: Popup) {
        self.popup = Some(popup);
    }
}

impl LayerTrait for Marker {
    crate::impl_layer_trait!(properties);

    fn options(&self) -> serde_json::Value {
        let color = match &self.style {
            MarkerStyle::Pin => None,
            MarkerStyle::Circle { color } => Some(color.clone()),
        };
        serde_json::json!({
            "position": {
                "lat": self.position.lat,
                "lng": self.position.lng
            },
            "zIndexOffset": self.properties.z_index,
            "color": color,
            "popup": self.popup.as_ref().map(|popup| popup.summary()),
        })
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        Some(point_bounds(self.position))
    }
}
