use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Totals reported by the routing service for a selected route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Meters
    #[serde(rename = "totalDistance")]
    pub total_distance: f64,
    /// Seconds
    #[serde(rename = "totalTime")]
    pub total_time: f64,
}

impl RouteSummary {
    pub fn new(total_distance: f64, total_time: f64) -> Self {
        Self {
            total_distance,
            total_time,
        }
    }

    pub fn km(&self) -> f64 {
        self.total_distance / 1000.0
    }

    /// Average pace; `None` for a zero-length route
    pub fn seconds_per_km(&self) -> Option<f64> {
        let km = self.km();
        (km > 0.0).then(|| self.total_time / km)
    }
}

/// Human-readable distance and travel time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteInfo {
    pub km: f64,
    /// `H:MM:SS`
    pub duration: String,
}

/// Converts a route summary into the distance and duration shown to users.
///
/// Zero-length routes are valid and produce `0` km with the total time
/// formatted as is. Negative or non-finite totals are rejected.
pub fn compute_route_info(summary: &RouteSummary) -> Result<RouteInfo> {
    let RouteSummary {
        total_distance,
        total_time,
    } = *summary;

    if !total_distance.is_finite() || total_distance < 0.0 {
        return Err(MapError::InvalidRoute(format!(
            "distance must be a non-negative number of meters, got {}",
            total_distance
        )));
    }
    if !total_time.is_finite() || total_time < 0.0 {
        return Err(MapError::InvalidRoute(format!(
            "duration must be a non-negative number of seconds, got {}",
            total_time
        )));
    }

    Ok(RouteInfo {
        km: summary.km(),
        duration: format_duration(total_time),
    })
}

/// Formats seconds as `H:MM:SS`; fractional seconds are truncated.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).trunc() as u64;
    let hours = total / 3600;
    let minutes = (total / 60) % 60;
    let secs = total % 60;
    format!("{}:{:02}:{:02}", hours, minutes, secs)
}
