use crate::{
    core::{config::RoutingConfig, geo::LatLng},
    routing::info::RouteSummary,
    runtime::HTTP_CLIENT,
    MapError, Result,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

/// The routing service. Path finding itself happens on the service side.
#[async_trait]
pub trait RoutingEngine: Send + Sync {
    /// Routes through `waypoints` in order.
    async fn route(&self, config: &RoutingConfig, waypoints: &[LatLng]) -> Result<RouteSummary>;
}

/// Client for an OSRM `route` service.
#[derive(Debug, Clone, Default)]
pub struct OsrmRouter {
    client: Option<reqwest::Client>,
}

#[derive(Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
}

impl OsrmRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Some(client),
        }
    }

    fn client(&self) -> &reqwest::Client {
        self.client.as_ref().unwrap_or(&*HTTP_CLIENT)
    }
}

/// `{service}/{profile}/{lng},{lat};...` with overview and steps disabled.
pub fn route_url(config: &RoutingConfig, waypoints: &[LatLng]) -> String {
    let coordinates = waypoints
        .iter()
        .map(|point| format!("{},{}", point.lng, point.lat))
        .collect::<Vec<_>>()
        .join(";");
    format!(
        "{}/{}/{}?overview=false&alternatives=false&steps=false",
        config.route.trim_end_matches('/'),
        config.profile,
        coordinates
    )
}

/// Picks the first route of an OSRM response.
pub fn parse_route_response(body: &str) -> Result<RouteSummary> {
    let response: OsrmResponse = serde_json::from_str(body)?;
    if response.code != "Ok" {
        return Err(MapError::Routing(
            response.message.unwrap_or(response.code),
        ));
    }

    response
        .routes
        .first()
        .map(|route| RouteSummary::new(route.distance, route.duration))
        .ok_or_else(|| MapError::Routing("no route found".to_string()))
}

#[async_trait]
impl RoutingEngine for OsrmRouter {
    async fn route(&self, config: &RoutingConfig, waypoints: &[LatLng]) -> Result<RouteSummary> {
        if waypoints.len() < 2 {
            return Err(MapError::Routing(format!(
                "at least two waypoints are required, got {}",
                waypoints.len()
            )));
        }

        let url = route_url(config, waypoints);
        log::debug!("Requesting route: {}", url);

        let response = self
            .client()
            .get(&url)
            .timeout(config.timeout())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        route_result(status, url, &body)
    }
}

/// Maps an OSRM answer to a route. OSRM answers 400 with a JSON body for
/// unroutable requests, so only unreadable error bodies become HTTP errors.
pub fn route_result(status: StatusCode, url: String, body: &str) -> Result<RouteSummary> {
    match parse_route_response(body) {
        Ok(summary) => Ok(summary),
        Err(MapError::Serialization(_)) if !status.is_success() => {
            log::warn!("Routing service answered {} for {}", status, url);
            Err(MapError::Http {
                status: status.as_u16(),
                url,
            })
        }
        Err(e) => Err(e),
    }
}
