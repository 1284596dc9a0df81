use crate::{
    core::geo::{LatLng, LatLngBounds},
    data::provider::ProviderPayload,
    runtime::HTTP_CLIENT,
    MapError, Result,
};
use async_trait::async_trait;
use serde::Serialize;

/// Request body understood by the provider endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderQuery {
    pub coordinates: ViewBounds,
    pub cards: bool,
}

/// Viewport bounds in the shape the mapping library serializes them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewBounds {
    #[serde(rename = "_southWest")]
    pub south_west: LatLng,
    #[serde(rename = "_northEast")]
    pub north_east: LatLng,
}

impl From<LatLngBounds> for ViewBounds {
    fn from(bounds: LatLngBounds) -> Self {
        Self {
            south_west: bounds.south_west,
            north_east: bounds.north_east,
        }
    }
}

impl ProviderQuery {
    pub fn new(bounds: LatLngBounds, cards: bool) -> Self {
        Self {
            coordinates: bounds.into(),
            cards,
        }
    }
}

/// Anything that can answer a provider query for a viewport.
#[async_trait]
pub trait ProviderSource: Send + Sync {
    async fn fetch(&self, endpoint: &str, query: &ProviderQuery) -> Result<ProviderPayload>;
}

/// Posts the query as JSON to the marketplace backend.
#[derive(Debug, Clone, Default)]
pub struct HttpProviderSource {
    client: Option<reqwest::Client>,
}

impl HttpProviderSource {
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

#[async_trait]
impl ProviderSource for HttpProviderSource {
    async fn fetch(&self, endpoint: &str, query: &ProviderQuery) -> Result<ProviderPayload> {
        log::debug!("Loading providers from {} (cards: {})", endpoint, query.cards);

        let response = self.client().post(endpoint).json(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MapError::Http {
                status: status.as_u16(),
                url: endpoint.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(ProviderPayload::from_body(&body, query.cards))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_body_shape() {
        let bounds = LatLngBounds::from_coords(37.0, -8.6, 37.2, -8.2);
        let body = serde_json::to_value(ProviderQuery::new(bounds, false)).unwrap();

        assert_eq!(body["cards"], false);
        assert_eq!(body["coordinates"]["_southWest"]["lat"], 37.0);
        assert_eq!(body["coordinates"]["_northEast"]["lng"], -8.2);
    }
}
