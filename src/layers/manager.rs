use crate::{layers::base::LayerTrait, prelude::HashMap};

/// A group of layers kept in drawing order (pane, then z-index).
///
/// The headless surface keeps its base tiles in one group and the delivery
/// radius circles in another.
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Ordered list of layer IDs for drawing
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Adds a layer, replacing any layer with the same ID
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) {
        let layer_id = layer.id().to_string();
        let key = (layer.pane(), layer.z_index());

        if self.layers.contains_key(&layer_id) {
            self.render_order.retain(|id| id != &layer_id);
        }
        self.layers.insert(layer_id.clone(), layer);

        let insert_pos = self
            .render_order
            .iter()
            .position(|id| {
                self.layers
                    .get(id)
                    .map(|l| (l.pane(), l.z_index()) > key)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, layer_id);
    }

    /// Removes a layer from the group
    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        self.render_order.retain(|id| id != layer_id);
        self.layers.remove(layer_id)
    }

    pub fn contains(&self, layer_id: &str) -> bool {
        self.layers.contains_key(layer_id)
    }

    /// Gets a reference to a layer by ID
    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(layer_id).map(|l| l.as_ref())
    }

    /// Gets a layer downcast to its concrete type
    pub fn get_as<T: 'static>(&self, layer_id: &str) -> Option<&T> {
        self.get_layer(layer_id)
            .and_then(|layer| layer.as_any().downcast_ref::<T>())
    }

    /// Layer IDs in drawing order
    pub fn list_layers(&self) -> &[String] {
        &self.render_order
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.render_order.clear();
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the group is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}
