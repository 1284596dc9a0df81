use crate::{
    core::geo::{LatLng, LatLngBounds},
    layers::base::{LayerProperties, LayerTrait, LayerType},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub opacity: f32,
    pub weight: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "blue".to_string(),
            opacity: 1.0,
            weight: 4.0,
        }
    }
}

/// Polyline drawn for the selected route.
pub struct RouteLine {
    properties: LayerProperties,
    waypoints: Vec<LatLng>,
    style: LineStyle,
}

impl RouteLine {
    pub fn new(id: String, waypoints: Vec<LatLng>, style: LineStyle) -> Self {
        Self {
            properties: LayerProperties::new(id, LayerType::Route),
            waypoints,
            style,
        }
    }

    pub fn waypoints(&self) -> &[LatLng] {
        &self.waypoints
    }

    pub fn style(&self) -> &LineStyle {
        &self.style
    }
}

impl LayerTrait for RouteLine {
    crate::impl_layer_trait!(properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "waypoints": self.waypoints,
            "styles": [self.style],
        })
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        let (first, rest) = self.waypoints.split_first()?;
        let mut bounds = LatLngBounds::new(*first, *first);
        for point in rest {
            bounds.extend(point);
        }
        Some(bounds)
    }
}
