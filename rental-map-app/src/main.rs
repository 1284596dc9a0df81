use anyhow::Context;
use async_trait::async_trait;
use rental_map::{
    data::{
        provider::ProviderPayload,
        source::{HttpProviderSource, ProviderQuery, ProviderSource},
    },
    prelude::*,
};
use std::path::PathBuf;

const TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSRM_URL: &str = "https://router.project-osrm.org/route/v1";

/// Serves providers from a JSON file instead of the marketplace backend
struct FileSource(PathBuf);

#[async_trait]
impl ProviderSource for FileSource {
    async fn fetch(&self, _endpoint: &str, query: &ProviderQuery) -> rental_map::Result<ProviderPayload> {
        let body = tokio::fs::read_to_string(&self.0)
            .await
            .map_err(|e| MapError::Validation(format!("{}: {}", self.0.display(), e)))?;
        Ok(ProviderPayload::from_body(&body, query.cards))
    }
}

/// Prints notifications to stdout
struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&self, message: &str) {
        println!("! {}", message);
    }
}

/// Loads providers around the default center, then optionally searches an
/// address, picks the first result and routes to the first provider.
///
/// Usage: `rental-map-app <providers.json | endpoint URL> [address]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let source = args
        .next()
        .context("usage: rental-map-app <providers.json | endpoint URL> [address]")?;
    let address = args.next();

    let widget = MapWidget::new(WidgetConfig::default(), HeadlessSurface::default())?
        .with_notifier(PrintNotifier);
    let mut widget = if source.starts_with("http://") || source.starts_with("https://") {
        widget.with_provider_source(HttpProviderSource::new())
    } else {
        widget.with_provider_source(FileSource(PathBuf::from(&source)))
    };

    widget
        .initialize(TILE_URL)
        .generate_button_base()
        .generate_location_search_widget()
        .locate_on_click();
    widget.enable_routing(RoutingConfig::new(OSRM_URL, "driving"));

    let created = widget.load_providers(false, &source).await?;
    println!("{} markers on the map", created);
    if let Some(buttons) = widget.button_bar() {
        for option in buttons.dropdown().options() {
            println!("  - {}", option);
        }
    }

    let Some(address) = address else {
        return Ok(());
    };

    let candidates = widget.search_location(&address).await?;
    for (index, candidate) in candidates.iter().enumerate() {
        println!("[{}] {} ({}, {})", index, candidate.label, candidate.lat, candidate.lng);
    }
    if candidates.is_empty() {
        println!("No location found for {:?}", address);
        return Ok(());
    }

    widget.pick_search_result(0).await?;
    let provider = widget.registry().providers().next().cloned();
    if let Some(provider) = provider {
        match widget.check_route(&provider).await {
            Ok(info) => println!("{}: {} km, {}", provider.trading_name, info.km, info.duration),
            Err(e) => log::warn!("No route to {}: {}", provider.trading_name, e),
        }
    }

    Ok(())
}
