//! Widget-wide defaults taken from the marketplace page the widget was built for.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Initial map center (Algarve, Portugal).
pub const DEFAULT_CENTER: (f64, f64) = (37.09681, -8.41965);

/// Initial zoom level and the zoom used when recentering on the client.
pub const DEFAULT_ZOOM: f64 = 11.0;

/// Map surface height when none is given.
pub const DEFAULT_HEIGHT: &str = "100vh";

/// Tile attribution shown in the corner of the map.
pub const DEFAULT_ATTRIBUTION: &str = "<a href='https://www.mapbox.com/about/maps/'>Mapbox</a> © <a href='http://www.openstreetmap.org/copyright'>OpenStreetMap</a>";

/// Public Nominatim instance.
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

/// Zoom requested for reverse geocoding (building level).
pub const REVERSE_GEOCODE_ZOOM: u8 = 18;

/// Routing request timeout in milliseconds.
pub const ROUTING_TIMEOUT_MS: u64 = 5000;

/// Reserved fingerprint of the client location marker.
pub const CLIENT_MARKER_TYPE: &str = "client-marker";

/// Drawing order of provider circle markers.
pub const PROVIDER_MARKER_Z_OFFSET: i32 = 2000;

/// Drawing order of the client marker.
pub const CLIENT_MARKER_Z_OFFSET: i32 = 1000;

/// Distance multiplier used by the cluster layer when spiderfying.
pub const SPIDERFY_DISTANCE_MULTIPLIER: f64 = 2.0;

/// Waypoint slot that holds the client location in a route plan.
pub const CLIENT_WAYPOINT_INDEX: usize = 1;

/// Placeholder option of the service type dropdown.
pub const TYPE_DROPDOWN_PLACEHOLDER: &str = "Select service type:";
