use async_trait::async_trait;
use rental_map::{
    data::provider::ProviderPayload,
    geocode::geolocation::PERMISSION_DENIED,
    prelude::*,
    ui::widget::{
        CLIENT_LOCATION_REQUIRED, COVERAGE_REQUIRES_TYPE, GEOLOCATION_FAILED,
        GEOLOCATION_TIMEOUT, PROVIDERS_UNAVAILABLE, ROUTE_NOT_FOUND,
    },
};
use std::sync::Mutex;

/// Widget tests driving the whole widget through fake services
#[cfg(test)]
mod widget_tests {
    use super::*;

    const TILES: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
    const ENDPOINT: &str = "https://rentals.example.org/location-providers";

    /// Answers every query with the same payload, or fails
    struct StaticSource {
        payload: Mutex<Option<ProviderPayload>>,
        queries: Arc<Mutex<Vec<ProviderQuery>>>,
    }

    impl StaticSource {
        fn new(payload: Option<ProviderPayload>) -> (Self, Arc<Mutex<Vec<ProviderQuery>>>) {
            let queries = Arc::new(Mutex::new(Vec::new()));
            let source = Self {
                payload: Mutex::new(payload),
                queries: Arc::clone(&queries),
            };
            (source, queries)
        }
    }

    #[async_trait]
    impl ProviderSource for StaticSource {
        async fn fetch(&self, endpoint: &str, query: &ProviderQuery) -> Result<ProviderPayload> {
            self.queries.lock().unwrap().push(query.clone());
            self.payload.lock().unwrap().clone().ok_or(MapError::Http {
                status: 500,
                url: endpoint.to_string(),
            })
        }
    }

    /// Routes any plan as the straight-line distance at 36 km/h
    struct StraightRouter;

    #[async_trait]
    impl RoutingEngine for StraightRouter {
        async fn route(&self, _config: &RoutingConfig, waypoints: &[LatLng]) -> Result<RouteSummary> {
            let meters: f64 = waypoints.windows(2).map(|w| w[0].distance_to(&w[1])).sum();
            Ok(RouteSummary::new(meters, meters / 10.0))
        }
    }

    struct NoRouter;

    #[async_trait]
    impl RoutingEngine for NoRouter {
        async fn route(&self, _config: &RoutingConfig, _waypoints: &[LatLng]) -> Result<RouteSummary> {
            Err(MapError::Routing("Impossible route between points".to_string()))
        }
    }

    /// Knows a handful of places and records reverse lookups
    #[derive(Default)]
    struct Gazetteer {
        reversed: Arc<Mutex<Vec<LatLng>>>,
    }

    #[async_trait]
    impl Geocoder for Gazetteer {
        async fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>> {
            let candidate = |label: &str, lat, lng| GeocodeCandidate {
                label: label.to_string(),
                lat,
                lng,
            };
            Ok(match query {
                "Lagos" => vec![
                    candidate("Lagos, Portugal", 37.1020, -8.6742),
                    candidate("Lagos, Nigeria", 6.4550, 3.3941),
                ],
                "Faro" => vec![candidate("Faro, Portugal", 37.0146, -7.9331)],
                _ => Vec::new(),
            })
        }

        async fn reverse_geocode(&self, position: LatLng) -> Result<String> {
            self.reversed.lock().unwrap().push(position);
            Ok(format!("Somewhere near {}", position))
        }
    }

    fn provider(id: &str, location: LatLng, services: &[(&str, &str)]) -> Provider {
        Provider {
            provider_id: id.to_string(),
            trading_name: format!("{} Rentals", id),
            location: None,
            logistics: Logistics {
                delivery_base_location: Some(location),
                delivery_radius: 20.0,
                does_deliveries: true,
                ..Logistics::default()
            },
            services: services
                .iter()
                .map(|(item, service)| Service::new(*item, *service))
                .collect(),
        }
    }

    fn algarve() -> Vec<Provider> {
        vec![
            provider(
                "OneBike",
                LatLng::new(37.14238, -8.54771),
                &[("race bike", "rental"), ("mountain bike", "rental")],
            ),
            provider("Kayaks", LatLng::new(37.0891, -8.2500), &[("kayak", "rental")]),
            provider("Pedal", LatLng::new(37.0600, -8.4000), &[("mountain bike", "rental")]),
        ]
    }

    fn widget(payload: Option<ProviderPayload>) -> (MapWidget<HeadlessSurface>, MemoryNotifier) {
        let notifier = MemoryNotifier::new();
        let (source, _) = StaticSource::new(payload);
        let mut widget = MapWidget::new(WidgetConfig::default(), HeadlessSurface::default())
            .unwrap()
            .with_notifier(notifier.clone())
            .with_provider_source(source)
            .with_router(StraightRouter)
            .with_geocoder(Gazetteer::default());
        widget.initialize(TILES).generate_button_base();
        (widget, notifier)
    }

    fn routing() -> RoutingConfig {
        RoutingConfig::new("https://router.example.org/route/v1", "car")
    }

    /// Creating the map twice keeps the first surface
    #[test]
    fn test_initialize_is_idempotent() {
        let mut widget = MapWidget::new(WidgetConfig::default(), HeadlessSurface::default()).unwrap();
        assert!(!widget.is_displayed());

        widget.initialize(TILES);
        widget.surface_mut().set_view(LatLng::new(38.7, -9.1), 9.0);
        widget.initialize("https://other.example.org/{z}/{x}/{y}.png");

        let surface = widget.surface();
        assert!(widget.is_displayed());
        assert!(surface.has_scale_control());
        assert_eq!(surface.tile_layer().unwrap().url_template(), TILES);
        assert_eq!(
            surface.cluster_config().map(|c| c.spiderfy_distance_multiplier),
            Some(2.0)
        );
        assert_eq!(surface.center(), LatLng::new(38.7, -9.1));
    }

    #[tokio::test]
    async fn test_load_before_initialize_fails() {
        let (source, queries) = StaticSource::new(Some(ProviderPayload::Records(algarve())));
        let mut widget = MapWidget::new(WidgetConfig::default(), HeadlessSurface::default())
            .unwrap()
            .with_provider_source(source);

        assert!(matches!(
            widget.load_providers(false, ENDPOINT).await,
            Err(MapError::NotInitialized)
        ));
        assert!(queries.lock().unwrap().is_empty());
    }

    /// Providers are queried for the bounds currently shown
    #[tokio::test]
    async fn test_load_providers_builds_markers_and_dropdown() {
        let notifier = MemoryNotifier::new();
        let (source, queries) = StaticSource::new(Some(ProviderPayload::Records(algarve())));
        let mut widget = MapWidget::new(WidgetConfig::default(), HeadlessSurface::default())
            .unwrap()
            .with_notifier(notifier.clone())
            .with_provider_source(source);
        widget.initialize(TILES);

        assert_eq!(widget.load_providers(false, ENDPOINT).await.unwrap(), 4);

        let queries = queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert!(!queries[0].cards);
        assert!(widget.bounds().contains(&LatLng::new(37.09681, -8.41965)));

        let buttons = widget.button_bar().unwrap();
        assert!(buttons.dropdown().is_built());
        assert_eq!(
            buttons.dropdown().options(),
            &["race bike rental", "mountain bike rental", "kayak rental"]
        );
        assert!(buttons.coverage().is_some());
        assert_eq!(widget.surface().clustered_markers().len(), 4);
        assert!(notifier.messages().is_empty());
    }

    /// An empty provider list wipes every marker, the client one included
    #[tokio::test]
    async fn test_empty_reload_clears_registry() {
        let (mut widget, _) = widget(Some(ProviderPayload::Records(algarve())));
        widget.load_providers(false, ENDPOINT).await.unwrap();
        widget.select_client_location(LatLng::new(37.0, -8.5)).await.unwrap();

        let (empty, _) = StaticSource::new(Some(ProviderPayload::Records(Vec::new())));
        let mut widget = widget.with_provider_source(empty);
        assert_eq!(widget.load_providers(false, ENDPOINT).await.unwrap(), 0);

        assert!(widget.registry().is_empty());
        assert!(widget.registry().client_marker().is_none());
        assert_eq!(widget.surface().marker_count(), 0);
    }

    /// Reloading the same viewport never duplicates markers
    #[tokio::test]
    async fn test_reload_is_deduplicated() {
        let (mut widget, _) = widget(Some(ProviderPayload::Records(algarve())));

        assert_eq!(widget.load_providers(false, ENDPOINT).await.unwrap(), 4);
        assert_eq!(widget.load_providers(false, ENDPOINT).await.unwrap(), 0);
        assert_eq!(widget.registry().len(), 4);
        assert_eq!(widget.surface().marker_count(), 4);
    }

    #[tokio::test]
    async fn test_card_payload_with_supplier_data() {
        let data = serde_json::to_string(&algarve()[..1]).unwrap().replace('"', "&quot;");
        let markup = format!(r#"<div class="card" data-supplierdata="{}">OneBike</div>"#, data);
        let (mut widget, _) = widget(Some(ProviderPayload::from_body(&markup, true)));

        assert_eq!(widget.load_providers(true, ENDPOINT).await.unwrap(), 2);
        assert_eq!(widget.cards_markup(), Some(markup.as_str()));
        assert_eq!(widget.registry().types(), vec!["race bike rental", "mountain bike rental"]);
    }

    /// Cards without embedded data leave the markers alone
    #[tokio::test]
    async fn test_card_payload_without_supplier_data() {
        let (mut widget, _) = widget(Some(ProviderPayload::Records(algarve())));
        widget.load_providers(false, ENDPOINT).await.unwrap();

        let markup = "<div class=\"card\">No providers here</div>";
        let (cards, _) = StaticSource::new(Some(ProviderPayload::from_body(markup, true)));
        let mut widget = widget.with_provider_source(cards);

        assert_eq!(widget.load_providers(true, ENDPOINT).await.unwrap(), 0);
        assert_eq!(widget.registry().len(), 4);
        assert_eq!(widget.cards_markup(), Some(markup));
        let dropdown = widget.button_bar().unwrap().dropdown();
        assert!(dropdown.is_built());
        assert!(dropdown.options().is_empty());
    }

    /// A failed fetch is reported once and the widget keeps working
    #[tokio::test]
    async fn test_provider_load_failure_notifies_once() {
        let (mut widget, notifier) = widget(None);

        assert!(matches!(
            widget.load_providers(false, ENDPOINT).await,
            Err(MapError::Http { status: 500, .. })
        ));
        assert_eq!(notifier.messages(), vec![PROVIDERS_UNAVAILABLE]);

        widget.select_client_location(LatLng::new(37.0, -8.5)).await.unwrap();
        assert!(widget.registry().client_marker().is_some());
    }

    #[tokio::test]
    async fn test_map_events_reload_only_when_visible() {
        let notifier = MemoryNotifier::new();
        let (source, queries) = StaticSource::new(Some(ProviderPayload::Records(algarve())));
        let mut widget = MapWidget::new(WidgetConfig::default(), HeadlessSurface::default())
            .unwrap()
            .with_notifier(notifier)
            .with_provider_source(source);
        widget.initialize(TILES);

        widget.surface_mut().resize(0.0, 0.0);
        assert_eq!(widget.handle_map_event(MapEvent::MoveEnd, false, ENDPOINT).await.unwrap(), None);
        assert_eq!(widget.handle_map_event(MapEvent::Resize, false, ENDPOINT).await.unwrap(), None);
        assert!(queries.lock().unwrap().is_empty());

        assert_eq!(widget.handle_map_event(MapEvent::Load, false, ENDPOINT).await.unwrap(), Some(4));

        widget.surface_mut().resize(800.0, 600.0);
        assert_eq!(widget.handle_map_event(MapEvent::MoveEnd, false, ENDPOINT).await.unwrap(), Some(0));
        assert_eq!(queries.lock().unwrap().len(), 2);
    }

    /// Filtering hides every other type without touching the registry
    #[tokio::test]
    async fn test_filter_by_type() {
        let (mut widget, _) = widget(Some(ProviderPayload::Records(algarve())));
        widget.load_providers(false, ENDPOINT).await.unwrap();
        let before = widget.registry().entries().to_vec();

        widget.filter_by_type("mountain bike rental");

        for entry in widget.registry().entries() {
            assert_eq!(
                widget.surface().is_clustered(entry.handles()[0]),
                entry.fingerprint() == "mountain bike rental"
            );
        }
        assert_eq!(widget.registry().entries(), before.as_slice());
        assert_eq!(
            widget.button_bar().unwrap().dropdown().selected(),
            Some("mountain bike rental")
        );

        // a reload keeps the selection applied
        widget.load_providers(false, ENDPOINT).await.unwrap();
        assert_eq!(widget.surface().clustered_markers().len(), 2);
    }

    #[tokio::test]
    async fn test_client_marker_is_a_singleton() {
        let (mut widget, _) = widget(None);
        widget.locate_on_click();

        let first = widget.handle_click(LatLng::new(37.0, -8.5)).await.unwrap().unwrap();
        let second = widget.handle_click(LatLng::new(37.2, -8.1)).await.unwrap().unwrap();

        assert!(matches!(first, ClientMarkerUpdate::Created(_)));
        assert_eq!(second, ClientMarkerUpdate::Moved(first.handle()));
        assert_eq!(widget.registry().len(), 1);
        assert_eq!(
            widget.registry().client_location(widget.surface()),
            Some(LatLng::new(37.2, -8.1))
        );
        assert_eq!(widget.surface().center(), LatLng::new(37.2, -8.1));
        assert_eq!(widget.surface().zoom(), 11.0);

        let marker = widget.surface().marker(first.handle()).unwrap();
        assert_eq!(
            marker.popup().unwrap().summary(),
            "Your chosen location: 37.2, -8.1"
        );
    }

    #[tokio::test]
    async fn test_clicks_ignored_until_enabled() {
        let (mut widget, _) = widget(None);
        assert_eq!(widget.handle_click(LatLng::new(37.0, -8.5)).await.unwrap(), None);
        assert!(widget.registry().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_client_location_rejected() {
        let (mut widget, _) = widget(None);
        assert!(matches!(
            widget.select_client_location(LatLng::new(91.0, 0.0)).await,
            Err(MapError::InvalidCoordinates(_))
        ));
        assert!(widget.registry().is_empty());
    }

    #[test]
    fn test_routing_attached_once() {
        let (mut widget, _) = widget(None);
        assert!(widget.enable_routing(routing()));
        assert!(!widget.enable_routing(RoutingConfig::new("https://elsewhere.example.org", "bike")));

        let control = widget.routing().unwrap();
        assert_eq!(control.config().profile, "car");
        assert_eq!(control.config().timeout_ms, 5000);
        assert_eq!(control.line_style().color, "blue");
        assert_eq!(control.line_style().weight, 4.0);
    }

    #[tokio::test]
    async fn test_check_route_requires_client_location() {
        let (mut widget, notifier) = widget(None);
        widget.enable_routing(routing());

        let result = widget.check_route(&algarve()[0]).await;

        assert!(matches!(result, Err(MapError::Validation(_))));
        assert_eq!(notifier.messages(), vec![CLIENT_LOCATION_REQUIRED]);
        assert!(widget.route_info().is_none());
    }

    #[tokio::test]
    async fn test_check_route_reports_distance() {
        let (mut widget, notifier) = widget(None);
        widget.enable_routing(routing());
        let client = LatLng::new(37.14238, -8.41965);
        widget.select_client_location(client).await.unwrap();
        // the plan still lacks a provider, so nothing was routed yet
        assert!(notifier.messages().is_empty());

        let provider = &algarve()[0];
        let info = widget.check_route(provider).await.unwrap();

        assert!((info.km - 11.37).abs() < 0.05, "{}", info.km);
        assert_eq!(widget.route_info(), Some(&info));
        assert_eq!(
            widget.routing().unwrap().waypoints(),
            Some(vec![provider.base_location().unwrap(), client])
        );
        assert_eq!(widget.surface().route_line().unwrap().waypoints().len(), 2);

        let message = notifier.last().unwrap();
        assert!(message.starts_with(&format!("This provider is {} km away", info.km)));
        assert!(message.ends_with(&format!("a trip of {} duration approximately.", info.duration)));
    }

    /// Moving the client re-routes an existing plan
    #[tokio::test]
    async fn test_new_client_location_reroutes() {
        let (mut widget, notifier) = widget(None);
        widget.enable_routing(routing());
        widget.select_client_location(LatLng::new(37.14238, -8.41965)).await.unwrap();
        let first = widget.check_route(&algarve()[0]).await.unwrap();

        widget.select_client_location(LatLng::new(37.14238, -8.30000)).await.unwrap();

        let second = widget.route_info().unwrap();
        assert!(second.km > first.km);
        assert_eq!(notifier.messages().len(), 2);
        assert_eq!(widget.routing().unwrap().plan().len(), 2);
    }

    /// A failed reroute still moves the client and leaves no stale route
    #[tokio::test]
    async fn test_client_move_survives_reroute_failure() {
        let (mut widget, notifier) = widget(None);
        widget.enable_routing(routing());
        widget.select_client_location(LatLng::new(37.14238, -8.41965)).await.unwrap();
        widget.check_route(&algarve()[0]).await.unwrap();

        let mut widget = widget.with_router(NoRouter);
        let moved = LatLng::new(37.14238, -8.30000);
        let update = widget.select_client_location(moved).await.unwrap();

        assert!(matches!(update, ClientMarkerUpdate::Moved(_)));
        assert_eq!(widget.registry().client_location(widget.surface()), Some(moved));
        assert_eq!(notifier.last().as_deref(), Some(ROUTE_NOT_FOUND));
        assert!(widget.route_info().is_none());
        assert!(widget.surface().route_line().is_none());
    }

    #[tokio::test]
    async fn test_routing_failure_notifies() {
        let (widget, notifier) = widget(None);
        let mut widget = widget.with_router(NoRouter);
        widget.enable_routing(routing());

        let result = widget
            .route(vec![LatLng::new(37.0, -8.0), LatLng::new(37.1, -8.1)])
            .await;

        assert!(matches!(result, Err(MapError::Routing(_))));
        assert_eq!(notifier.messages(), vec![ROUTE_NOT_FOUND]);
        assert!(widget.surface().route_line().is_none());
    }

    #[tokio::test]
    async fn test_route_without_routing_enabled() {
        let (mut widget, _) = widget(None);
        assert!(matches!(
            widget.route(vec![LatLng::new(37.0, -8.0), LatLng::new(37.1, -8.1)]).await,
            Err(MapError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn test_coverage_requires_a_selected_type() {
        let (mut widget, notifier) = widget(Some(ProviderPayload::Records(algarve())));
        widget.load_providers(false, ENDPOINT).await.unwrap();

        assert!(widget.toggle_coverage(true).is_err());
        assert_eq!(notifier.messages(), vec![COVERAGE_REQUIRES_TYPE]);
        assert_eq!(widget.surface().radius_count(), 0);
        assert!(!widget.button_bar().unwrap().coverage().unwrap().checked);

        widget.filter_by_type("kayak rental");
        assert_eq!(widget.toggle_coverage(true).unwrap(), 4);
        assert_eq!(widget.surface().radius_count(), 4);
        assert!(widget.button_bar().unwrap().coverage().unwrap().checked);

        assert_eq!(widget.toggle_coverage(false).unwrap(), 0);
        assert_eq!(widget.surface().radius_count(), 0);
    }

    /// A reload that no longer offers the selected type shows every marker
    /// again and takes the coverage circles down
    #[tokio::test]
    async fn test_reload_dropping_selected_type() {
        let (mut widget, notifier) = widget(Some(ProviderPayload::Records(algarve())));
        widget.load_providers(false, ENDPOINT).await.unwrap();
        widget.filter_by_type("kayak rental");
        assert_eq!(widget.toggle_coverage(true).unwrap(), 4);
        assert_eq!(widget.surface().clustered_markers().len(), 1);

        let (bikes, _) = StaticSource::new(Some(ProviderPayload::Records(algarve()[..1].to_vec())));
        let mut widget = widget.with_provider_source(bikes);
        widget.load_providers(false, ENDPOINT).await.unwrap();

        let buttons = widget.button_bar().unwrap();
        assert_eq!(buttons.dropdown().selected(), None);
        assert!(!buttons.coverage().unwrap().checked);
        assert_eq!(widget.surface().clustered_markers().len(), 4);
        assert_eq!(widget.surface().radius_count(), 0);

        assert_eq!(widget.toggle_coverage(false).unwrap(), 0);
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_unchecking_coverage_needs_no_selection() {
        let (mut widget, notifier) = widget(Some(ProviderPayload::Records(algarve())));
        widget.load_providers(false, ENDPOINT).await.unwrap();

        assert_eq!(widget.toggle_coverage(false).unwrap(), 0);
        assert!(notifier.messages().is_empty());
        assert!(!widget.button_bar().unwrap().coverage().unwrap().checked);
    }

    /// Route and coverage belong to markers, so an empty reload drops them too
    #[tokio::test]
    async fn test_empty_reload_clears_route_and_coverage() {
        let (mut widget, _) = widget(Some(ProviderPayload::Records(algarve())));
        widget.enable_routing(routing());
        widget.load_providers(false, ENDPOINT).await.unwrap();
        widget.select_client_location(LatLng::new(37.14238, -8.41965)).await.unwrap();
        widget.check_route(&algarve()[0]).await.unwrap();
        widget.filter_by_type("kayak rental");
        widget.toggle_coverage(true).unwrap();

        let (empty, _) = StaticSource::new(Some(ProviderPayload::Records(Vec::new())));
        let mut widget = widget.with_provider_source(empty);
        widget.load_providers(false, ENDPOINT).await.unwrap();

        assert!(widget.route_info().is_none());
        assert!(widget.surface().route_line().is_none());
        assert_eq!(widget.surface().radius_count(), 0);
        assert!(!widget.button_bar().unwrap().coverage().unwrap().checked);
    }

    #[tokio::test]
    async fn test_delivery_radius_toggle() {
        let (mut widget, _) = widget(None);
        let provider = &algarve()[0];

        assert!(widget.toggle_delivery_radius(provider).unwrap());
        let circle = widget
            .surface()
            .radii()
            .get_as::<Circle>("radius-OneBike")
            .unwrap();
        assert_eq!(circle.radius_meters(), 20_000.0);
        assert_eq!(circle.center(), LatLng::new(37.14238, -8.54771));

        assert!(!widget.toggle_delivery_radius(provider).unwrap());
        assert_eq!(widget.surface().radius_count(), 0);

        let mut pickup_only = provider.clone();
        pickup_only.logistics.does_deliveries = false;
        assert!(widget.toggle_delivery_radius(&pickup_only).is_err());
    }

    /// Search results keep the service order; no results is not an error
    #[tokio::test]
    async fn test_search_location() {
        let (mut widget, notifier) = widget(None);
        widget.generate_location_search_widget();

        let results = widget.search_location("Lagos").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].label, "Lagos, Portugal");
        assert_eq!(results[1].label, "Lagos, Nigeria");
        assert_eq!(widget.button_bar().unwrap().search().unwrap().query, "Lagos");

        assert!(widget.search_location("Atlantis").await.unwrap().is_empty());
        assert!(widget.search_results().is_empty());
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_pick_search_result_moves_client() {
        let (mut widget, _) = widget(None);
        widget.search_location("Lagos").await.unwrap();

        widget.pick_search_result(0).await.unwrap();
        assert_eq!(
            widget.registry().client_location(widget.surface()),
            Some(LatLng::new(37.1020, -8.6742))
        );
        assert!(widget.pick_search_result(7).await.is_err());
    }

    /// A superseded search never overwrites newer results
    #[tokio::test]
    async fn test_stale_search_results_are_discarded() {
        let (mut widget, _) = widget(None);

        let lagos = widget.begin_search("Lagos");
        let faro = widget.begin_search("Faro");

        let faro = faro.run().await;
        assert!(widget.apply_search(faro).unwrap());

        let lagos = lagos.run().await;
        assert!(matches!(lagos.result, Err(MapError::Aborted)));
        assert!(!widget.apply_search(lagos).unwrap());

        let labels: Vec<_> = widget.search_results().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Faro, Portugal"]);
    }

    #[tokio::test]
    async fn test_locate_browser_sets_client_marker() {
        let (widget, notifier) = widget(None);
        let mut widget = widget.with_geolocation(FixedLocation::at(LatLng::new(37.05, -8.3)));

        let update = widget.locate_browser().await.unwrap();

        assert!(matches!(update, ClientMarkerUpdate::Created(_)));
        assert_eq!(widget.surface().center(), LatLng::new(37.05, -8.3));
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_locate_browser_failures_are_classified() {
        let (widget, notifier) = widget(None);
        let mut widget = widget.with_geolocation(FixedLocation::failing(GeolocationError::timeout()));
        assert!(matches!(
            widget.locate_browser().await,
            Err(MapError::Geolocation(GeolocationFailure::Timeout))
        ));
        assert_eq!(notifier.last().as_deref(), Some(GEOLOCATION_TIMEOUT));

        let mut widget = widget.with_geolocation(FixedLocation::failing(GeolocationError::new(
            PERMISSION_DENIED,
            "User denied Geolocation",
        )));
        assert!(widget.locate_browser().await.is_err());
        assert_eq!(notifier.last().as_deref(), Some(GEOLOCATION_FAILED));
        assert!(widget.registry().client_marker().is_none());
    }

    #[tokio::test]
    async fn test_locate_without_geolocation() {
        let (mut widget, notifier) = widget(None);
        assert!(widget.locate_browser().await.is_err());
        assert_eq!(notifier.messages(), vec![GEOLOCATION_FAILED]);
    }

    /// Reverse geocoding looks up the coordinates it is given
    #[tokio::test]
    async fn test_reverse_geocode_uses_given_coordinates() {
        let gazetteer = Gazetteer::default();
        let reversed = Arc::clone(&gazetteer.reversed);
        let mut widget = MapWidget::new(WidgetConfig::default(), HeadlessSurface::default())
            .unwrap()
            .with_geocoder(gazetteer);
        widget.initialize(TILES);
        widget.select_client_location(LatLng::new(37.0, -8.0)).await.unwrap();

        let name = widget.reverse_geocode(LatLng::new(37.5, -8.5)).await.unwrap();

        assert_eq!(name, "Somewhere near 37.5, -8.5");
        assert_eq!(*reversed.lock().unwrap(), vec![LatLng::new(37.5, -8.5)]);
    }

    #[test]
    fn test_rental_popup_and_helpers() {
        let config = WidgetConfig::default().with_site_origin("https://rentals.example.org");
        let widget = MapWidget::new(config, HeadlessSurface::default()).unwrap();
        let provider = &algarve()[0];

        let popup = widget.rental_popup(provider, 1).unwrap();
        assert_eq!(popup.title, "OneBike Rentals");
        assert_eq!(popup.subtitle, "Mountain bike rental");
        assert_eq!(
            popup.read_more_url.as_deref(),
            Some("https://rentals.example.org/provider?alias=OneBike+Rentals")
        );
        assert_eq!(popup.next.provider_id, "OneBike");
        assert!(widget.rental_popup(provider, 2).is_none());

        assert_eq!(
            widget.round_coordinates(Some(37.123456), Some(-8.123456)),
            Some(LatLng::new(37.12346, -8.12346))
        );
        assert_eq!(widget.round_coordinates(None, Some(1.0)), None);

        let base = provider.base_location().unwrap();
        assert!(widget.within_radius(base, LatLng::new(37.14238, -8.41965), 20.0));
        assert!(!widget.within_radius(base, LatLng::new(38.0, -8.5), 20.0));
    }

    #[tokio::test]
    async fn test_remove_map_then_reinitialize() {
        let (mut widget, _) = widget(Some(ProviderPayload::Records(algarve())));
        widget.load_providers(false, ENDPOINT).await.unwrap();
        widget.invalidate_size();
        assert_eq!(widget.surface().invalidations(), 1);

        widget.remove_map();
        assert!(!widget.is_displayed());
        assert!(!widget.surface().is_mounted());
        assert!(widget.registry().is_empty());

        widget.initialize(TILES);
        assert_eq!(widget.load_providers(false, ENDPOINT).await.unwrap(), 4);
    }

    #[test]
    fn test_explanatory_texts() {
        let (mut widget, _) = widget(None);
        widget
            .explanatory_texts(Some("Find a rental"), "Click the map to pick your location")
            .generate_browser_locate_widget();

        let buttons = widget.button_bar().unwrap();
        let text = buttons.explanatory().unwrap();
        assert_eq!(text.title.as_deref(), Some("Find a rental"));
        assert_eq!(text.paragraph, "Click the map to pick your location");
        assert!(buttons.classes().iter().any(|c| c == "emphasis"));
        assert!(buttons.has_locate_button());
    }
}
