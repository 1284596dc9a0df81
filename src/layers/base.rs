use crate::core::geo::{LatLng, LatLngBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Tile,
    Marker,
    CircleMarker,
    Circle,
    Route,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Tile => write!(f, "tile"),
            LayerType::Marker => write!(f, "marker"),
            LayerType::CircleMarker => write!(f, "circle-marker"),
            LayerType::Circle => write!(f, "circle"),
            LayerType::Route => write!(f, "route"),
        }
    }
}

/// Map pane a layer is drawn into. Panes stack in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pane {
    Tile,
    Overlay,
    Marker,
    Popup,
}

/// State shared by every layer kind
#[derive(Debug, Clone, PartialEq)]
pub struct LayerProperties {
    pub id: String,
    pub layer_type: LayerType,
    pub pane: Pane,
    /// Order within the pane, higher draws on top
    pub z_index: i32,
    pub visible: bool,
}

impl LayerProperties {
    pub fn new(id: String, layer_type: LayerType) -> Self {
        let pane = match layer_type {
            LayerType::Tile => Pane::Tile,
            LayerType::Circle | LayerType::Route => Pane::Overlay,
            LayerType::Marker | LayerType::CircleMarker => Pane::Marker,
        };
        Self {
            id,
            layer_type,
            pane,
            z_index: 0,
            visible: true,
        }
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}

/// Everything that can sit on the map surface.
///
/// Implementors only provide their properties, options and `Any` casts
/// (see [`impl_layer_trait!`](crate::impl_layer_trait)); the rest derives
/// from those.
pub trait LayerTrait: Send + Sync {
    fn properties(&self) -> &LayerProperties;

    fn properties_mut(&mut self) -> &mut LayerProperties;

    /// Layer options as the mapping library would receive them
    fn options(&self) -> serde_json::Value;

    fn as_any(&self) -> &dyn std::any::Any;

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;

    fn id(&self) -> &str {
        &self.properties().id
    }

    fn layer_type(&self) -> LayerType {
        self.properties().layer_type
    }

    fn pane(&self) -> Pane {
        self.properties().pane
    }

    fn z_index(&self) -> i32 {
        self.properties().z_index
    }

    fn is_visible(&self) -> bool {
        self.properties().visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.properties_mut().visible = visible;
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        None
    }
}

/// Bounds of a single point
pub(crate) fn point_bounds(position: LatLng) -> LatLngBounds {
    LatLngBounds::new(position, position)
}
