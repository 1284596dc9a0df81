use crate::prelude::HashMap;

/// Assigns each service type a colour the first time it is seen and keeps
/// returning the same one afterwards.
#[derive(Debug, Clone, Default)]
pub struct ColorPalette {
    colors: HashMap<String, String>,
}

impl ColorPalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_for(&mut self, service_type: &str) -> String {
        if let Some(color) = self.colors.get(service_type) {
            return color.clone();
        }
        let color = derive_color(service_type);
        self.colors.insert(service_type.to_string(), color.clone());
        color
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Colour channels come from the type's hash, so a type keeps its colour
/// across page loads.
fn derive_color(service_type: &str) -> String {
    let hash = fxhash::hash64(service_type);
    let r = (hash & 0xff) as u8;
    let g = ((hash >> 8) & 0xff) as u8;
    let b = ((hash >> 16) & 0xff) as u8;
    format!("rgb({}, {}, {})", r, g, b)
}
