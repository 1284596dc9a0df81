//! The map widget of the rental marketplace page
//!
//! [`MapWidget`] owns the map surface, the marker registry, the button bar
//! and the routing control, and turns user interactions (clicks, dropdown
//! changes, search picks, popup buttons) into updates of those parts.
//!
//! ```rust,no_run
//! use rental_map::prelude::*;
//!
//! # async fn demo() -> rental_map::Result<()> {
//! let mut widget = MapWidget::new(WidgetConfig::default(), HeadlessSurface::default())?;
//! widget
//!     .initialize("https://tile.openstreetmap.org/{z}/{x}/{y}.png")
//!     .generate_button_base()
//!     .locate_on_click();
//! widget.load_providers(false, "https://rentals.example.org/location-providers").await?;
//! # Ok(())
//! # }
//! ```

use crate::{
    core::{
        config::{RoutingConfig, WidgetConfig},
        constants::CLIENT_WAYPOINT_INDEX,
        geo::{self, LatLng, LatLngBounds},
    },
    data::{
        provider::{Provider, ProviderPayload},
        source::{HttpProviderSource, ProviderQuery, ProviderSource},
    },
    geocode::{
        client::{GeocodeCandidate, GeocodeClient, Geocoder},
        geolocation::{self, GeolocationFailure, GeolocationProvider},
    },
    layers::{circle::Circle, tile::TileLayer},
    markers::registry::{ClientMarkerUpdate, MarkerRegistry},
    routing::{
        control::{RouteEvent, RoutingControl},
        engine::{OsrmRouter, RoutingEngine},
        info::RouteInfo,
    },
    runtime::{Completed, PendingRequest, RequestTracker},
    surface::MapSurface,
    ui::{
        controls::ButtonBar,
        notify::{LogNotifier, Notifier},
        popup::RentalPopup,
    },
    MapError, Result,
};
use std::sync::Arc;

pub const ROUTE_NOT_FOUND: &str = "Ops, we couldn't find a route between these points";
pub const CLIENT_LOCATION_REQUIRED: &str = "You need to select a location you will be at by clicking on the map, or entering an address or providing your location through the browser";
pub const GEOLOCATION_TIMEOUT: &str = "Connection timed out while retrieving your position";
pub const GEOLOCATION_FAILED: &str =
    "An error occurred trying to find your location through your browser.";
pub const COVERAGE_REQUIRES_TYPE: &str =
    "Select a service type from the dropdown menu above the map";
pub const PROVIDERS_UNAVAILABLE: &str = "We couldn't load the rental providers for this area";
pub const SEARCH_FAILED: &str = "We couldn't look up this address, please try again";

fn route_found_message(info: &RouteInfo) -> String {
    format!(
        "This provider is {} km away from your chosen location, a trip of {} duration approximately.",
        info.km, info.duration
    )
}

/// Map lifecycle events that trigger a provider reload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    Load,
    MoveEnd,
    Resize,
}

/// Whether `point` lies within `radius_km` of `base`. The radius is
/// truncated to whole kilometres.
pub fn within_radius(base: LatLng, point: LatLng, radius_km: f64) -> bool {
    base.distance_to(&point) <= radius_km.trunc() * 1000.0
}

pub struct MapWidget<S: MapSurface> {
    config: WidgetConfig,
    surface: S,
    registry: MarkerRegistry,
    buttons: Option<ButtonBar>,
    routing: Option<RoutingControl>,
    displayed: bool,
    locate_on_click: bool,
    route_info: Option<RouteInfo>,
    cards_markup: Option<String>,

    notifier: Box<dyn Notifier>,
    provider_source: Arc<dyn ProviderSource>,
    geocoder: Arc<dyn Geocoder>,
    router: Arc<dyn RoutingEngine>,
    geolocation: Option<Arc<dyn GeolocationProvider>>,

    searches: RequestTracker,
    locates: RequestTracker,
}

impl<S: MapSurface> MapWidget<S> {
    /// Creates a widget on `surface` talking to the public services from
    /// `config`. Nothing is shown until [`MapWidget::initialize`].
    pub fn new(config: WidgetConfig, surface: S) -> Result<Self> {
        let geocoder = GeocodeClient::new(config.geocoder.clone())?;
        Ok(Self {
            registry: MarkerRegistry::new(config.site_origin.clone()),
            config,
            surface,
            buttons: None,
            routing: None,
            displayed: false,
            locate_on_click: false,
            route_info: None,
            cards_markup: None,
            notifier: Box::new(LogNotifier),
            provider_source: Arc::new(HttpProviderSource::new()),
            geocoder: Arc::new(geocoder),
            router: Arc::new(OsrmRouter::new()),
            geolocation: None,
            searches: RequestTracker::new(),
            locates: RequestTracker::new(),
        })
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_provider_source(mut self, source: impl ProviderSource + 'static) -> Self {
        self.provider_source = Arc::new(source);
        self
    }

    pub fn with_geocoder(mut self, geocoder: impl Geocoder + 'static) -> Self {
        self.geocoder = Arc::new(geocoder);
        self
    }

    pub fn with_router(mut self, router: impl RoutingEngine + 'static) -> Self {
        self.router = Arc::new(router);
        self
    }

    pub fn with_geolocation(mut self, provider: impl GeolocationProvider + 'static) -> Self {
        self.geolocation = Some(Arc::new(provider));
        self
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    pub fn button_bar(&self) -> Option<&ButtonBar> {
        self.buttons.as_ref()
    }

    pub fn routing(&self) -> Option<&RoutingControl> {
        self.routing.as_ref()
    }

    pub fn is_displayed(&self) -> bool {
        self.displayed
    }

    /// Last successfully selected route
    pub fn route_info(&self) -> Option<&RouteInfo> {
        self.route_info.as_ref()
    }

    /// Markup of the last card-mode provider response
    pub fn cards_markup(&self) -> Option<&str> {
        self.cards_markup.as_deref()
    }

    fn buttons_mut(&mut self) -> &mut ButtonBar {
        self.buttons.get_or_insert_with(ButtonBar::new)
    }

    fn ensure_displayed(&self) -> Result<()> {
        if self.displayed {
            Ok(())
        } else {
            Err(MapError::NotInitialized)
        }
    }

    /// Shows the map with `tile_url` as base layer. Later calls do nothing.
    pub fn initialize(&mut self, tile_url: &str) -> &mut Self {
        if self.displayed {
            return self;
        }

        let view = &self.config.view;
        let tiles = TileLayer::new(
            "tiles".to_string(),
            tile_url.to_string(),
            view.attribution.clone(),
        );
        self.surface.mount(tiles, view.center, view.zoom);
        self.surface.create_cluster_group(&self.config.cluster);
        if view.scale_control {
            self.surface.add_scale_control();
        }
        self.displayed = true;
        log::info!(
            "Map initialized at {} zoom {} (height {})",
            view.center,
            view.zoom,
            view.height
        );
        self
    }

    pub fn generate_button_base(&mut self) -> &mut Self {
        self.buttons_mut();
        self
    }

    pub fn explanatory_texts(&mut self, title: Option<&str>, paragraph: &str) -> &mut Self {
        self.buttons_mut()
            .set_explanatory(title.map(str::to_string), paragraph.to_string());
        self
    }

    pub fn generate_location_search_widget(&mut self) -> &mut Self {
        self.buttons_mut().ensure_search();
        self
    }

    pub fn generate_browser_locate_widget(&mut self) -> &mut Self {
        self.buttons_mut().add_locate_button();
        self
    }

    /// Fetches the providers inside the current view and rebuilds markers
    /// and the type dropdown. Fetch failures are reported to the user once
    /// and returned; they are not retried.
    pub async fn load_providers(&mut self, cards: bool, endpoint: &str) -> Result<usize> {
        self.ensure_displayed()?;

        let query = ProviderQuery::new(self.surface.bounds(), cards);
        let payload = match self.provider_source.fetch(endpoint, &query).await {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("Failed to load providers from {}: {}", endpoint, e);
                self.notifier.notify(PROVIDERS_UNAVAILABLE);
                return Err(e);
            }
        };

        let providers = match payload {
            ProviderPayload::Records(providers) => providers,
            ProviderPayload::Cards { markup, providers } => {
                self.cards_markup = Some(markup);
                match providers {
                    Some(providers) => providers,
                    None => {
                        log::debug!("Card markup carries no supplier data");
                        let buttons = self.buttons_mut();
                        buttons.dropdown_mut().rebuild(&[]);
                        buttons.ensure_coverage_toggle();
                        return Ok(0);
                    }
                }
            }
        };

        if providers.is_empty() {
            self.clear_coverage();
            self.surface.set_route_line(None);
            self.route_info = None;
        }
        let created = self.registry.load_providers(&providers, &mut self.surface);

        let buttons = self.buttons.get_or_insert_with(ButtonBar::new);
        let had_selection = buttons.dropdown().selected().is_some();
        buttons.dropdown_mut().rebuild(&providers);
        buttons.ensure_coverage_toggle();
        match buttons.dropdown().selected().map(str::to_string) {
            Some(selected) => self.registry.filter_by_type(&selected, &mut self.surface),
            None if had_selection => {
                log::debug!("Selected type no longer offered, showing every marker");
                self.registry.show_all(&mut self.surface);
                self.clear_coverage();
            }
            None => {}
        }

        log::info!("{} providers in view, {} new markers", providers.len(), created);
        Ok(created)
    }

    /// Reloads providers for a map event. Moves and resizes only reload while
    /// the map is visible. Returns `None` when nothing was reloaded.
    pub async fn handle_map_event(
        &mut self,
        event: MapEvent,
        cards: bool,
        endpoint: &str,
    ) -> Result<Option<usize>> {
        match event {
            MapEvent::Load => {}
            MapEvent::MoveEnd | MapEvent::Resize if self.surface.is_visible() => {}
            MapEvent::MoveEnd | MapEvent::Resize => {
                log::debug!("Ignoring {:?} on a hidden map", event);
                return Ok(None);
            }
        }
        self.load_providers(cards, endpoint).await.map(Some)
    }

    /// Attaches the routing control. Returns false if it already was.
    pub fn enable_routing(&mut self, config: RoutingConfig) -> bool {
        if self.routing.is_some() {
            return false;
        }
        log::info!("Routing enabled with {} ({})", config.route, config.profile);
        self.routing = Some(RoutingControl::new(config));
        true
    }

    /// Routes through `points` and tells the user how far the trip is.
    pub async fn route(&mut self, points: Vec<LatLng>) -> Result<RouteInfo> {
        let control = self.routing.as_mut().ok_or(MapError::NotInitialized)?;
        control.set_waypoints(points);
        self.compute_route().await
    }

    async fn compute_route(&mut self) -> Result<RouteInfo> {
        let control = self.routing.as_mut().ok_or(MapError::NotInitialized)?;
        match control.compute(self.router.as_ref()).await {
            RouteEvent::RouteSelected { info, .. } => {
                self.surface.set_route_line(control.route_line());
                self.notifier.notify(&route_found_message(&info));
                self.route_info = Some(info.clone());
                Ok(info)
            }
            RouteEvent::RoutingError(message) => {
                self.surface.set_route_line(None);
                self.route_info = None;
                self.notifier.notify(ROUTE_NOT_FOUND);
                Err(MapError::Routing(message))
            }
        }
    }

    /// "Check route" popup button: routes from `provider` to the client
    /// location.
    pub async fn check_route(&mut self, provider: &Provider) -> Result<RouteInfo> {
        let Some(client) = self.registry.client_location(&self.surface) else {
            self.notifier.notify(CLIENT_LOCATION_REQUIRED);
            return Err(MapError::Validation("no client location selected".to_string()));
        };
        let base = provider.base_location().ok_or_else(|| {
            MapError::Validation(format!("provider {} has no base location", provider.provider_id))
        })?;
        self.route(vec![base, client]).await
    }

    /// Places the client marker at `position` and recenters on it. With
    /// routing on, the client waypoint is replaced and a complete plan is
    /// routed again.
    pub async fn select_client_location(&mut self, position: LatLng) -> Result<ClientMarkerUpdate> {
        self.ensure_displayed()?;
        if !position.is_valid() {
            return Err(MapError::InvalidCoordinates(position.to_string()));
        }

        let update = self.registry.upsert_client_marker(position, &mut self.surface);
        self.surface.set_view(position, self.config.view.client_zoom);

        let reroute = match self.routing.as_mut() {
            Some(control) => {
                control.splice_waypoints(CLIENT_WAYPOINT_INDEX, 1, position);
                control.is_complete()
            }
            None => false,
        };
        if reroute {
            if let Err(e) = self.compute_route().await {
                log::debug!("Reroute after client move failed: {}", e);
            }
        }
        Ok(update)
    }

    /// Makes map clicks pick the client location.
    pub fn locate_on_click(&mut self) -> &mut Self {
        self.locate_on_click = true;
        self
    }

    pub async fn handle_click(&mut self, position: LatLng) -> Result<Option<ClientMarkerUpdate>> {
        if !self.locate_on_click {
            return Ok(None);
        }
        self.select_client_location(position).await.map(Some)
    }

    /// Starts an address search, aborting the previous one. The returned
    /// request can be driven independently and handed to
    /// [`MapWidget::apply_search`].
    pub fn begin_search(&mut self, query: &str) -> PendingRequest<Vec<GeocodeCandidate>> {
        let search = self.buttons_mut().ensure_search();
        search.query = query.to_string();

        let geocoder = Arc::clone(&self.geocoder);
        let query = query.to_string();
        self.searches
            .track(async move { geocoder.search(&query).await })
    }

    /// Applies a finished search. Returns false when the search was superseded
    /// and its results were discarded.
    pub fn apply_search(&mut self, completed: Completed<Vec<GeocodeCandidate>>) -> Result<bool> {
        if !self.searches.complete(completed.token) {
            return Ok(false);
        }
        match completed.result {
            Ok(candidates) => {
                log::debug!("{} locations found", candidates.len());
                self.buttons_mut().ensure_search().results = candidates;
                Ok(true)
            }
            Err(e) => {
                log::warn!("Location search failed: {}", e);
                self.notifier.notify(SEARCH_FAILED);
                Err(e)
            }
        }
    }

    pub async fn search_location(&mut self, query: &str) -> Result<Vec<GeocodeCandidate>> {
        let completed = self.begin_search(query).run().await;
        if self.apply_search(completed)? {
            Ok(self.search_results().to_vec())
        } else {
            Err(MapError::Aborted)
        }
    }

    pub fn search_results(&self) -> &[GeocodeCandidate] {
        self.buttons
            .as_ref()
            .and_then(|buttons| buttons.search())
            .map(|search| search.results.as_slice())
            .unwrap_or(&[])
    }

    /// Moves the client marker to one of the listed search results.
    pub async fn pick_search_result(&mut self, index: usize) -> Result<ClientMarkerUpdate> {
        let position = self
            .search_results()
            .get(index)
            .map(GeocodeCandidate::position)
            .ok_or_else(|| MapError::Validation(format!("no search result at {}", index)))?;
        self.select_client_location(position).await
    }

    /// Starts a browser position lookup, aborting the previous one.
    pub fn begin_locate(&mut self) -> PendingRequest<LatLng> {
        let provider = self.geolocation.clone();
        self.locates.track(async move {
            let provider = provider.ok_or_else(|| {
                GeolocationFailure::Other("geolocation is not available".to_string())
            })?;
            let position = geolocation::locate_browser(provider.as_ref()).await?;
            Ok::<LatLng, MapError>(position)
        })
    }

    /// Applies a finished position lookup. Returns `None` for superseded
    /// lookups.
    pub async fn apply_locate(
        &mut self,
        completed: Completed<LatLng>,
    ) -> Result<Option<ClientMarkerUpdate>> {
        if !self.locates.complete(completed.token) {
            return Ok(None);
        }
        match completed.result {
            Ok(position) => self.select_client_location(position).await.map(Some),
            Err(e) => {
                let message = match &e {
                    MapError::Geolocation(GeolocationFailure::Timeout) => GEOLOCATION_TIMEOUT,
                    _ => GEOLOCATION_FAILED,
                };
                log::error!("Browser location failed: {}", e);
                self.notifier.notify(message);
                Err(e)
            }
        }
    }

    /// Uses the host position as client location.
    pub async fn locate_browser(&mut self) -> Result<ClientMarkerUpdate> {
        let completed = self.begin_locate().run().await;
        self.apply_locate(completed)
            .await?
            .ok_or(MapError::Aborted)
    }

    /// Shows only markers of `selected` and selects it in the dropdown.
    pub fn filter_by_type(&mut self, selected: &str) {
        if let Some(buttons) = self.buttons.as_mut() {
            buttons.dropdown_mut().select(selected);
        }
        self.registry.filter_by_type(selected, &mut self.surface);
    }

    /// Draws or removes the delivery area of every listed provider. Drawing
    /// requires a service type to be selected. Returns the number of circles
    /// drawn.
    pub fn toggle_coverage(&mut self, checked: bool) -> Result<usize> {
        self.buttons_mut().ensure_coverage_toggle();
        self.clear_coverage();
        if !checked {
            return Ok(0);
        }

        let buttons = self.buttons.get_or_insert_with(ButtonBar::new);
        if buttons.dropdown().selected().is_none() {
            self.notifier.notify(COVERAGE_REQUIRES_TYPE);
            return Err(MapError::Validation("no service type selected".to_string()));
        }
        let Some(coverage) = buttons.coverage_mut() else {
            return Ok(0);
        };
        coverage.checked = true;

        for entry in self.registry.entries() {
            let Some(provider) = entry.provider() else {
                continue;
            };
            let Some(center) = provider.base_location() else {
                continue;
            };
            let id = format!("coverage-{}", entry.reference());
            self.surface.add_radius(Circle::new(
                id.clone(),
                center,
                provider.logistics.delivery_radius_meters(),
            ));
            coverage.circles.push(id);
        }
        log::debug!("Showing {} coverage areas", coverage.circles.len());
        Ok(coverage.circles.len())
    }

    /// Removes drawn coverage circles and unchecks the toggle.
    fn clear_coverage(&mut self) {
        let Some(coverage) = self.buttons.as_mut().and_then(ButtonBar::coverage_mut) else {
            return;
        };
        for id in coverage.circles.drain(..) {
            self.surface.remove_radius(&id);
        }
        coverage.checked = false;
    }

    /// Popup "delivery radius" button. Returns whether the circle is shown
    /// afterwards.
    pub fn toggle_delivery_radius(&mut self, provider: &Provider) -> Result<bool> {
        if !provider.logistics.does_deliveries {
            return Err(MapError::Validation(format!(
                "provider {} does not deliver",
                provider.provider_id
            )));
        }
        let center = provider.base_location().ok_or_else(|| {
            MapError::Validation(format!("provider {} has no base location", provider.provider_id))
        })?;

        let id = format!("radius-{}", provider.provider_id);
        if self.surface.has_radius(&id) {
            self.surface.remove_radius(&id);
            Ok(false)
        } else {
            self.surface.add_radius(Circle::new(
                id,
                center,
                provider.logistics.delivery_radius_meters(),
            ));
            Ok(true)
        }
    }

    pub fn within_radius(&self, base: LatLng, point: LatLng, radius_km: f64) -> bool {
        within_radius(base, point, radius_km)
    }

    /// Tears the map down. It can be initialized again afterwards.
    pub fn remove_map(&mut self) {
        self.registry.clear(&mut self.surface);
        self.surface.remove();
        self.displayed = false;
        log::info!("Map removed");
    }

    pub fn invalidate_size(&mut self) {
        self.surface.invalidate_size();
    }

    pub fn bounds(&self) -> LatLngBounds {
        self.surface.bounds()
    }

    pub fn round_coordinates(&self, lat: Option<f64>, lng: Option<f64>) -> Option<LatLng> {
        geo::round_coordinates(lat, lng)
    }

    pub async fn reverse_geocode(&self, position: LatLng) -> Result<String> {
        self.geocoder.reverse_geocode(position).await
    }

    pub fn rental_popup(&self, provider: &Provider, service_index: usize) -> Option<RentalPopup> {
        RentalPopup::build(provider, service_index, &self.config.site_origin)
    }
}
