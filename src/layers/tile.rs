use crate::layers::base::{LayerProperties, LayerTrait, LayerType};

/// Base tile layer. Fetching and drawing tiles is left to the mapping
/// library; this layer only carries the URL template and attribution.
pub struct TileLayer {
    properties: LayerProperties,
    url_template: String,
    attribution: String,
}

impl TileLayer {
    pub fn new(id: String, url_template: String, attribution: String) -> Self {
        Self {
            properties: LayerProperties::new(id, LayerType::Tile),
            url_template,
            attribution,
        }
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    pub fn attribution(&self) -> &str {
        &self.attribution
    }
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "url": self.url_template,
            "attribution": self.attribution,
        })
    }
}
