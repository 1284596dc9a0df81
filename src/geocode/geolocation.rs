use crate::core::geo::LatLng;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error codes used by position providers
pub const PERMISSION_DENIED: u16 = 1;
pub const POSITION_UNAVAILABLE: u16 = 2;
pub const TIMEOUT: u16 = 3;

/// Raw failure reported by a position provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeolocationError {
    pub code: u16,
    pub message: String,
}

impl GeolocationError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn timeout() -> Self {
        Self::new(TIMEOUT, "Timeout expired")
    }
}

/// What the widget tells the user about a failed lookup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationFailure {
    #[error("position lookup timed out")]
    Timeout,
    #[error("position lookup failed: {0}")]
    Other(String),
}

impl From<GeolocationError> for GeolocationFailure {
    fn from(error: GeolocationError) -> Self {
        if error.code == TIMEOUT {
            GeolocationFailure::Timeout
        } else {
            GeolocationFailure::Other(error.message)
        }
    }
}

/// Source of the user's current position, such as the browser
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn locate(&self) -> Result<LatLng, GeolocationError>;
}

/// Provider answering with a preset outcome
#[derive(Debug, Clone)]
pub struct FixedLocation(pub Result<LatLng, GeolocationError>);

impl FixedLocation {
    pub fn at(position: LatLng) -> Self {
        Self(Ok(position))
    }

    pub fn failing(error: GeolocationError) -> Self {
        Self(Err(error))
    }
}

#[async_trait]
impl GeolocationProvider for FixedLocation {
    async fn locate(&self) -> Result<LatLng, GeolocationError> {
        self.0.clone()
    }
}

/// Asks `provider` for a position and classifies any failure.
pub async fn locate_browser(
    provider: &dyn GeolocationProvider,
) -> Result<LatLng, GeolocationFailure> {
    match provider.locate().await {
        Ok(position) if position.is_valid() => Ok(position),
        Ok(position) => Err(GeolocationFailure::Other(format!(
            "invalid position {}",
            position
        ))),
        Err(error) => {
            log::warn!("Geolocation error {}: {}", error.code, error.message);
            Err(error.into())
        }
    }
}
