//! # rental-map
//!
//! Headless model of the provider map shown on a rental marketplace page.
//!
//! The widget displays provider markers grouped by service type, draws
//! delivery radius overlays, routes between a chosen client location and a
//! provider, and offers address search and browser geolocation. The mapping
//! library, routing service, geocoder and notification surface are reached
//! through traits so the whole widget runs without a browser.

pub mod core;
pub mod data;
pub mod geocode;
pub mod layers;
pub mod markers;
pub mod prelude;
pub mod routing;
pub mod runtime;
pub mod surface;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{RoutingConfig, WidgetConfig},
    geo::{LatLng, LatLngBounds},
};

pub use data::provider::{Logistics, Provider, Service};

pub use geocode::{
    client::{GeocodeCandidate, GeocodeClient, Geocoder},
    geolocation::{GeolocationFailure, GeolocationProvider},
};

pub use markers::registry::{MarkerEntry, MarkerRegistry};

pub use routing::info::{RouteInfo, RouteSummary};

pub use surface::{headless::HeadlessSurface, MapSurface};

pub use ui::{notify::Notifier, widget::MapWidget};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Routing error: {0}")]
    Routing(String),

    #[error("Geolocation error: {0}")]
    Geolocation(#[from] GeolocationFailure),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid route summary: {0}")]
    InvalidRoute(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Map has not been initialized")]
    NotInitialized,

    #[error("Request was superseded")]
    Aborted,
}

/// Error type alias for convenience
pub type Error = MapError;
