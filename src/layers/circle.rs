use crate::{
    core::geo::{LatLng, LatLngBounds},
    layers::base::{LayerProperties, LayerTrait, LayerType},
};

/// Meters per degree of latitude, for approximate bounds only
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Geographic circle, used for delivery radius overlays.
pub struct Circle {
    properties: LayerProperties,
    center: LatLng,
    radius_meters: f64,
}

impl Circle {
    pub fn new(id: String, center: LatLng, radius_meters: f64) -> Self {
        Self {
            properties: LayerProperties::new(id, LayerType::Circle),
            center,
            radius_meters: radius_meters.max(0.0),
        }
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    /// Whether `point` lies within the circle (great-circle distance).
    pub fn contains(&self, point: &LatLng) -> bool {
        self.center.distance_to(point) <= self.radius_meters
    }
}

impl LayerTrait for Circle {
    crate::impl_layer_trait!(properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "center": {
                "lat": self.center.lat,
                "lng": self.center.lng
            },
            "radius": self.radius_meters,
        })
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        let d_lat = self.radius_meters / METERS_PER_DEGREE;
        let cos_lat = self.center.lat.to_radians().cos().abs().max(1e-6);
        let d_lng = d_lat / cos_lat;
        Some(LatLngBounds::around(self.center, d_lat * 2.0, d_lng * 2.0))
    }
}
