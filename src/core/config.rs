//! Configuration for the widget and the services it talks to
//!
//! The widget is configured once at construction through [`WidgetConfig`],
//! which groups the view defaults, the geocoder settings and the routing
//! defaults. Routing itself is switched on later with a [`RoutingConfig`],
//! the plain `{route, profile, points}` options structure the page passes in.

use crate::core::{
    constants::{
        DEFAULT_ATTRIBUTION, DEFAULT_CENTER, DEFAULT_GEOCODER_URL, DEFAULT_HEIGHT, DEFAULT_ZOOM,
        ROUTING_TIMEOUT_MS, SPIDERFY_DISTANCE_MULTIPLIER,
    },
    geo::LatLng,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetConfig {
    pub view: ViewConfig,
    pub geocoder: GeocoderConfig,
    pub cluster: ClusterConfig,
    /// Origin used to build "read more" links in provider popups
    pub site_origin: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            view: ViewConfig::default(),
            geocoder: GeocoderConfig::default(),
            cluster: ClusterConfig::default(),
            site_origin: "http://localhost".to_string(),
        }
    }
}

impl WidgetConfig {
    pub fn with_height(mut self, height: impl Into<String>) -> Self {
        self.view.height = height.into();
        self
    }

    pub fn with_center(mut self, center: LatLng, zoom: f64) -> Self {
        self.view.center = center;
        self.view.zoom = zoom;
        self
    }

    pub fn with_geocoder_url(mut self, base_url: impl Into<String>) -> Self {
        self.geocoder.base_url = base_url.into();
        self
    }

    pub fn with_site_origin(mut self, origin: impl Into<String>) -> Self {
        self.site_origin = origin.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    /// CSS height of the map surface
    pub height: String,
    pub center: LatLng,
    pub zoom: f64,
    /// Zoom applied when the view is recentered on the client location
    pub client_zoom: f64,
    pub attribution: String,
    pub scale_control: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT.to_string(),
            center: LatLng::from(DEFAULT_CENTER),
            zoom: DEFAULT_ZOOM,
            client_zoom: DEFAULT_ZOOM,
            attribution: DEFAULT_ATTRIBUTION.to_string(),
            scale_control: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying user agent
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            user_agent: concat!("rental-map/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    pub spiderfy_distance_multiplier: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            spiderfy_distance_multiplier: SPIDERFY_DISTANCE_MULTIPLIER,
        }
    }
}

/// Options passed when routing is enabled on the widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Base URL of an OSRM service
    pub route: String,
    /// OSRM profile, typically `car` or `bike`
    pub profile: String,
    /// Initial waypoints; empty slots are filled as locations get picked
    #[serde(default)]
    pub points: Vec<LatLng>,
    #[serde(default = "default_routing_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_routing_timeout_ms() -> u64 {
    ROUTING_TIMEOUT_MS
}

impl RoutingConfig {
    pub fn new(route: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            profile: profile.into(),
            points: Vec::new(),
            timeout_ms: ROUTING_TIMEOUT_MS,
        }
    }

    pub fn with_points(mut self, points: Vec<LatLng>) -> Self {
        self.points = points;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
