use crate::{
    core::{
        config::ClusterConfig,
        geo::{LatLng, LatLngBounds},
    },
    layers::{
        circle::Circle, manager::LayerManager, marker::Marker,
        route_line::RouteLine, tile::TileLayer,
    },
    prelude::{HashMap, HashSet},
    surface::{MapSurface, MarkerHandle},
    ui::popup::Popup,
};

const TILE_SIZE: f64 = 256.0;

/// In-memory surface for running the widget without a browser.
///
/// The visible extent is approximated linearly from the zoom level and the
/// container size, which is close enough for viewport-scoped queries.
pub struct HeadlessSurface {
    mounted: bool,
    base: LayerManager,
    scale_control: bool,
    center: LatLng,
    zoom: f64,
    size: (f64, f64),
    next_handle: u64,
    markers: HashMap<MarkerHandle, Marker>,
    cluster: Option<ClusterConfig>,
    clustered: HashSet<MarkerHandle>,
    on_map: HashSet<MarkerHandle>,
    radii: LayerManager,
    route: Option<RouteLine>,
    invalidations: usize,
}

impl HeadlessSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            mounted: false,
            base: LayerManager::new(),
            scale_control: false,
            center: LatLng::default(),
            zoom: 0.0,
            size: (width, height),
            next_handle: 0,
            markers: HashMap::default(),
            cluster: None,
            clustered: HashSet::default(),
            on_map: HashSet::default(),
            radii: LayerManager::new(),
            route: None,
            invalidations: 0,
        }
    }

    /// Simulates a layout change of the container.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.size = (width, height);
    }

    pub fn has_scale_control(&self) -> bool {
        self.scale_control
    }

    pub fn tile_layer(&self) -> Option<&TileLayer> {
        self.base.get_as::<TileLayer>("tiles")
    }

    /// Options the cluster group was created with
    pub fn cluster_config(&self) -> Option<&ClusterConfig> {
        self.cluster.as_ref()
    }

    /// Markers currently shown through the cluster group, sorted by handle
    pub fn clustered_markers(&self) -> Vec<MarkerHandle> {
        let mut handles: Vec<_> = self.clustered.iter().copied().collect();
        handles.sort();
        handles
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn radius_count(&self) -> usize {
        self.radii.len()
    }

    pub fn radii(&self) -> &LayerManager {
        &self.radii
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(1024.0, 768.0)
    }
}

impl MapSurface for HeadlessSurface {
    fn mount(&mut self, tiles: TileLayer, center: LatLng, zoom: f64) {
        self.base.add_layer(Box::new(tiles));
        self.center = center;
        self.zoom = zoom;
        self.mounted = true;
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn add_scale_control(&mut self) {
        self.scale_control = true;
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.zoom = zoom;
    }

    fn center(&self) -> LatLng {
        self.center
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn bounds(&self) -> LatLngBounds {
        let degrees_per_pixel = 360.0 / (TILE_SIZE * 2f64.powf(self.zoom));
        let span_lng = (self.size.0 * degrees_per_pixel).min(360.0);
        let span_lat = (self.size.1 * degrees_per_pixel).min(180.0);
        LatLngBounds::around(self.center, span_lat, span_lng)
    }

    fn is_visible(&self) -> bool {
        self.mounted && self.size.0 > 0.0 && self.size.1 > 0.0
    }

    fn invalidate_size(&mut self) {
        self.invalidations += 1;
    }

    fn remove(&mut self) {
        self.base.clear();
        self.markers.clear();
        self.cluster = None;
        self.clustered.clear();
        self.on_map.clear();
        self.radii.clear();
        self.route = None;
        self.scale_control = false;
        self.mounted = false;
    }

    fn create_marker(&mut self, marker: Marker) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        self.markers.insert(handle, marker);
        handle
    }

    fn marker(&self, handle: MarkerHandle) -> Option<&Marker> {
        self.markers.get(&handle)
    }

    fn move_marker(&mut self, handle: MarkerHandle, position: LatLng) {
        if let Some(marker) = self.markers.get_mut(&handle) {
            marker.set_position(position);
        }
    }

    fn bind_popup(&mut self, handle: MarkerHandle, popup: Popup) {
        if let Some(marker) = self.markers.get_mut(&handle) {
            marker.set_popup(popup);
        }
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.clustered.remove(&handle);
        self.on_map.remove(&handle);
        self.markers.remove(&handle);
    }

    fn create_cluster_group(&mut self, config: &ClusterConfig) {
        self.cluster = Some(config.clone());
    }

    fn add_to_cluster(&mut self, handle: MarkerHandle) {
        if self.markers.contains_key(&handle) {
            self.clustered.insert(handle);
        }
    }

    fn remove_from_cluster(&mut self, handle: MarkerHandle) {
        self.clustered.remove(&handle);
    }

    fn is_clustered(&self, handle: MarkerHandle) -> bool {
        self.clustered.contains(&handle)
    }

    fn add_to_map(&mut self, handle: MarkerHandle) {
        if self.markers.contains_key(&handle) {
            self.on_map.insert(handle);
        }
    }

    fn is_on_map(&self, handle: MarkerHandle) -> bool {
        self.on_map.contains(&handle)
    }

    fn add_radius(&mut self, circle: Circle) {
        self.radii.add_layer(Box::new(circle));
    }

    fn remove_radius(&mut self, id: &str) {
        self.radii.remove_layer(id);
    }

    fn has_radius(&self, id: &str) -> bool {
        self.radii.contains(id)
    }

    fn set_route_line(&mut self, line: Option<RouteLine>) {
        if let Some(line) = &line {
            log::debug!("Drawing route through {} waypoints", line.waypoints().len());
        }
        self.route = line;
    }

    fn route_line(&self) -> Option<&RouteLine> {
        self.route.as_ref()
    }
}
