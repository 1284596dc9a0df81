//! The seam between the widget and the mapping library
//!
//! [`MapSurface`] is the subset of the mapping library the widget drives:
//! the view, a marker cluster group, a layer group for delivery radii,
//! free-standing markers and the route polyline. Clustering, projection and
//! tile drawing stay on the library side.

pub mod headless;

use crate::{
    core::{
        config::ClusterConfig,
        geo::{LatLng, LatLngBounds},
    },
    layers::{circle::Circle, marker::Marker, route_line::RouteLine, tile::TileLayer},
    ui::popup::Popup,
};

/// Opaque reference to a marker owned by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub(crate) u64);

impl MarkerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MarkerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "marker-{}", self.0)
    }
}

pub trait MapSurface: Send {
    /// Installs the base tile layer and shows the map.
    fn mount(&mut self, tiles: TileLayer, center: LatLng, zoom: f64);

    fn is_mounted(&self) -> bool;

    fn add_scale_control(&mut self);

    fn set_view(&mut self, center: LatLng, zoom: f64);

    fn center(&self) -> LatLng;

    fn zoom(&self) -> f64;

    /// Geographic extent currently shown
    fn bounds(&self) -> LatLngBounds;

    /// Whether the map container currently has a non-zero size
    fn is_visible(&self) -> bool;

    /// Recomputes the container size after layout changes.
    fn invalidate_size(&mut self);

    /// Tears the map down, dropping every layer.
    fn remove(&mut self);

    /// Takes ownership of a marker without showing it.
    fn create_marker(&mut self, marker: Marker) -> MarkerHandle;

    fn marker(&self, handle: MarkerHandle) -> Option<&Marker>;

    fn move_marker(&mut self, handle: MarkerHandle, position: LatLng);

    fn bind_popup(&mut self, handle: MarkerHandle, popup: Popup);

    /// Drops a marker from every group it was shown in.
    fn remove_marker(&mut self, handle: MarkerHandle);

    /// Creates the marker cluster group provider markers are shown in.
    fn create_cluster_group(&mut self, config: &ClusterConfig);

    fn add_to_cluster(&mut self, handle: MarkerHandle);

    fn remove_from_cluster(&mut self, handle: MarkerHandle);

    fn is_clustered(&self, handle: MarkerHandle) -> bool;

    /// Shows a marker directly on the map, outside the cluster group.
    fn add_to_map(&mut self, handle: MarkerHandle);

    fn is_on_map(&self, handle: MarkerHandle) -> bool;

    /// Adds a circle to the delivery radius group.
    fn add_radius(&mut self, circle: Circle);

    fn remove_radius(&mut self, id: &str);

    fn has_radius(&self, id: &str) -> bool;

    fn set_route_line(&mut self, line: Option<RouteLine>);

    fn route_line(&self) -> Option<&RouteLine>;
}
