//! Bookkeeping for the markers the widget has put on the map
//!
//! Each provider service becomes one circle marker. Entries are grouped by
//! their type fingerprint (`"{item type} {service}"`), which is what the type
//! dropdown filters on, and deduplicated by a reference key made of item
//! type, service and serialized base location, so reloading the same
//! viewport never draws a provider twice. The client's chosen location is a
//! single extra entry with the reserved `client-marker` fingerprint.

use crate::{
    core::{constants::CLIENT_MARKER_TYPE, geo::LatLng},
    data::provider::{Provider, Service},
    layers::marker::Marker,
    markers::color::ColorPalette,
    prelude::HashSet,
    surface::MapSurface,
    ui::popup::{Popup, RentalPopup},
};

pub use crate::surface::MarkerHandle;

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerEntry {
    fingerprint: String,
    reference: String,
    handles: Vec<MarkerHandle>,
    provider: Option<Provider>,
}

impl MarkerEntry {
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn handles(&self) -> &[MarkerHandle] {
        &self.handles
    }

    /// The owning provider; `None` for the client marker
    pub fn provider(&self) -> Option<&Provider> {
        self.provider.as_ref()
    }

    pub fn is_client(&self) -> bool {
        self.provider.is_none() && self.fingerprint == CLIENT_MARKER_TYPE
    }
}

/// Reference key deduplicating provider markers.
pub fn reference_key(service: &Service, location: &LatLng) -> String {
    format!(
        "{}-{}-{}",
        service.item_type,
        service.service,
        location.to_compact_json()
    )
}

/// What [`MarkerRegistry::upsert_client_marker`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMarkerUpdate {
    Created(MarkerHandle),
    Moved(MarkerHandle),
}

impl ClientMarkerUpdate {
    pub fn handle(&self) -> MarkerHandle {
        match self {
            Self::Created(handle) | Self::Moved(handle) => *handle,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarkerRegistry {
    entries: Vec<MarkerEntry>,
    index: HashSet<String>,
    client: Option<usize>,
    palette: ColorPalette,
    site_origin: String,
}

impl MarkerRegistry {
    pub fn new(site_origin: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            index: HashSet::default(),
            client: None,
            palette: ColorPalette::new(),
            site_origin: site_origin.into(),
        }
    }

    /// Appends an entry unless `reference` is already indexed. Returns
    /// whether a new entry was created.
    pub fn add(
        &mut self,
        fingerprint: impl Into<String>,
        reference: impl Into<String>,
        handle: MarkerHandle,
        provider: Option<Provider>,
    ) -> bool {
        let reference = reference.into();
        if self.index.contains(&reference) {
            return false;
        }

        self.index.insert(reference.clone());
        self.entries.push(MarkerEntry {
            fingerprint: fingerprint.into(),
            reference,
            handles: vec![handle],
            provider,
        });
        true
    }

    pub fn contains_reference(&self, reference: &str) -> bool {
        self.index.contains(reference)
    }

    /// Creates one circle marker per provider service and adds it to the
    /// cluster group. An empty list wipes the registry. Returns the number of
    /// markers created.
    pub fn load_providers(&mut self, providers: &[Provider], surface: &mut dyn MapSurface) -> usize {
        if providers.is_empty() {
            self.clear(surface);
            return 0;
        }

        let mut created = 0;
        for provider in providers {
            let Some(location) = provider.base_location() else {
                log::warn!("Provider {} has no base location, skipping", provider.provider_id);
                continue;
            };

            for (service_index, service) in provider.services.iter().enumerate() {
                if self.make_marker(provider, service_index, service, location, surface) {
                    created += 1;
                }
            }
        }

        log::debug!(
            "Loaded {} providers, {} new markers, {} total",
            providers.len(),
            created,
            self.len()
        );
        created
    }

    fn make_marker(
        &mut self,
        provider: &Provider,
        service_index: usize,
        service: &Service,
        location: LatLng,
        surface: &mut dyn MapSurface,
    ) -> bool {
        let reference = reference_key(service, &location);
        if self.contains_reference(&reference) {
            return false;
        }

        let fingerprint = service.type_label();
        let color = self.palette.color_for(&fingerprint);
        let mut marker = Marker::circle(reference.clone(), location, color);
        if let Some(popup) = RentalPopup::build(provider, service_index, &self.site_origin) {
            marker = marker.with_popup(Popup::Rental(Box::new(popup)));
        }

        let handle = surface.create_marker(marker);
        surface.add_to_cluster(handle);
        self.add(fingerprint, reference, handle, Some(provider.clone()))
    }

    /// Shows markers whose type equals `selected` and hides the rest. Only
    /// cluster membership changes; entries stay registered.
    pub fn filter_by_type(&self, selected: &str, surface: &mut dyn MapSurface) {
        for entry in self.entries.iter().filter(|entry| !entry.is_client()) {
            for handle in &entry.handles {
                if entry.fingerprint == selected {
                    surface.add_to_cluster(*handle);
                } else {
                    surface.remove_from_cluster(*handle);
                }
            }
        }
    }

    /// Puts every provider marker back in the cluster group.
    pub fn show_all(&self, surface: &mut dyn MapSurface) {
        for entry in self.entries.iter().filter(|entry| !entry.is_client()) {
            for handle in &entry.handles {
                surface.add_to_cluster(*handle);
            }
        }
    }

    /// Moves the client marker to `position`, creating it on first use.
    pub fn upsert_client_marker(
        &mut self,
        position: LatLng,
        surface: &mut dyn MapSurface,
    ) -> ClientMarkerUpdate {
        if let Some(handle) = self.client_handle() {
            surface.move_marker(handle, position);
            surface.bind_popup(handle, Popup::client_location(position));
            return ClientMarkerUpdate::Moved(handle);
        }

        let marker = Marker::pin(CLIENT_MARKER_TYPE.to_string(), position)
            .with_popup(Popup::client_location(position));
        let handle = surface.create_marker(marker);
        surface.add_to_map(handle);

        self.add(CLIENT_MARKER_TYPE, CLIENT_MARKER_TYPE, handle, None);
        self.client = Some(self.entries.len() - 1);
        ClientMarkerUpdate::Created(handle)
    }

    /// Removes every marker from the map and resets all bookkeeping.
    pub fn clear(&mut self, surface: &mut dyn MapSurface) {
        for handle in self.entries.iter().flat_map(|entry| entry.handles.iter()) {
            surface.remove_marker(*handle);
        }
        self.entries.clear();
        self.index.clear();
        self.client = None;
    }

    pub fn entries(&self) -> &[MarkerEntry] {
        &self.entries
    }

    pub fn client_marker(&self) -> Option<&MarkerEntry> {
        self.client.and_then(|index| self.entries.get(index))
    }

    fn client_handle(&self) -> Option<MarkerHandle> {
        self.client_marker()
            .and_then(|entry| entry.handles.first().copied())
    }

    /// Current position of the client marker, read back from the surface
    pub fn client_location(&self, surface: &dyn MapSurface) -> Option<LatLng> {
        self.client_handle()
            .and_then(|handle| surface.marker(handle))
            .map(|marker| marker.position())
    }

    /// Distinct provider types in the order they were first registered
    pub fn types(&self) -> Vec<&str> {
        let mut seen = HashSet::default();
        self.entries
            .iter()
            .filter(|entry| !entry.is_client())
            .map(|entry| entry.fingerprint.as_str())
            .filter(|fingerprint| seen.insert(*fingerprint))
            .collect()
    }

    /// Providers behind the registered markers, one per entry
    pub fn providers(&self) -> impl Iterator<Item = &Provider> {
        self.entries.iter().filter_map(|entry| entry.provider.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MarkerRegistry {
    fn default() -> Self {
        Self::new(crate::core::config::WidgetConfig::default().site_origin)
    }
}
