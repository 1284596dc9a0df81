//! Prelude module for common rental-map types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use rental_map::prelude::*;`

pub use crate::core::{
    config::{ClusterConfig, GeocoderConfig, RoutingConfig, ViewConfig, WidgetConfig},
    geo::{round_coordinates, LatLng, LatLngBounds},
};

pub use crate::data::{
    provider::{Logistics, Provider, ProviderPayload, Service},
    source::{HttpProviderSource, ProviderQuery, ProviderSource},
};

pub use crate::geocode::{
    client::{GeocodeCandidate, GeocodeClient, Geocoder},
    geolocation::{FixedLocation, GeolocationError, GeolocationFailure, GeolocationProvider},
};

pub use crate::layers::{
    base::LayerTrait, circle::Circle, manager::LayerManager, marker::Marker, tile::TileLayer,
};

pub use crate::markers::registry::{ClientMarkerUpdate, MarkerEntry, MarkerHandle, MarkerRegistry};

pub use crate::routing::{
    control::{RouteEvent, RoutingControl},
    engine::{OsrmRouter, RoutingEngine},
    info::{compute_route_info, RouteInfo, RouteSummary},
};

pub use crate::runtime::{Completed, PendingRequest, RequestToken, RequestTracker};

pub use crate::surface::{headless::HeadlessSurface, MapSurface};

pub use crate::ui::{
    controls::{ButtonBar, DropdownState, TypeDropdown},
    notify::{LogNotifier, MemoryNotifier, Notifier},
    popup::{Popup, RentalPopup},
    widget::{MapEvent, MapWidget},
};

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
