use crate::{
    core::{config::RoutingConfig, geo::LatLng},
    layers::route_line::{LineStyle, RouteLine},
    routing::{
        engine::RoutingEngine,
        info::{compute_route_info, RouteInfo, RouteSummary},
    },
};

/// Outcome of a routing attempt, mirroring the routing control's events
#[derive(Debug, Clone, PartialEq)]
pub enum RouteEvent {
    RouteSelected { summary: RouteSummary, info: RouteInfo },
    RoutingError(String),
}

/// Waypoint plan plus the last selected route.
///
/// Slots stay empty until a location is known, so the plan may be partial.
/// Routing only happens once every slot is filled.
#[derive(Debug, Clone)]
pub struct RoutingControl {
    config: RoutingConfig,
    plan: Vec<Option<LatLng>>,
    line_style: LineStyle,
    selected: Option<(RouteSummary, RouteInfo)>,
}

impl RoutingControl {
    pub fn new(config: RoutingConfig) -> Self {
        let mut plan: Vec<Option<LatLng>> = config.points.iter().copied().map(Some).collect();
        while plan.len() < 2 {
            plan.push(None);
        }
        Self {
            config,
            plan,
            line_style: LineStyle::default(),
            selected: None,
        }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn line_style(&self) -> &LineStyle {
        &self.line_style
    }

    pub fn plan(&self) -> &[Option<LatLng>] {
        &self.plan
    }

    pub fn set_waypoints(&mut self, points: Vec<LatLng>) {
        self.plan = points.into_iter().map(Some).collect();
        while self.plan.len() < 2 {
            self.plan.push(None);
        }
    }

    /// Removes `remove` slots at `index` and inserts `point` there, padding
    /// the plan with empty slots if it is too short.
    pub fn splice_waypoints(&mut self, index: usize, remove: usize, point: LatLng) {
        while self.plan.len() < index {
            self.plan.push(None);
        }
        let end = (index + remove).min(self.plan.len());
        self.plan.splice(index..end, std::iter::once(Some(point)));
    }

    /// All waypoints, if every slot is filled
    pub fn waypoints(&self) -> Option<Vec<LatLng>> {
        if self.plan.len() < 2 {
            return None;
        }
        self.plan.iter().copied().collect()
    }

    pub fn is_complete(&self) -> bool {
        self.waypoints().is_some()
    }

    pub fn selected(&self) -> Option<&(RouteSummary, RouteInfo)> {
        self.selected.as_ref()
    }

    /// Asks `engine` for a route through the current plan.
    pub async fn compute(&mut self, engine: &dyn RoutingEngine) -> RouteEvent {
        let Some(waypoints) = self.waypoints() else {
            return RouteEvent::RoutingError("route plan has empty waypoints".to_string());
        };

        let summary = match engine.route(&self.config, &waypoints).await {
            Ok(summary) => summary,
            Err(e) => {
                log::warn!("Routing failed: {}", e);
                self.selected = None;
                return RouteEvent::RoutingError(e.to_string());
            }
        };

        match compute_route_info(&summary) {
            Ok(info) => {
                log::info!("Route selected: {} km, {}", info.km, info.duration);
                self.selected = Some((summary, info.clone()));
                RouteEvent::RouteSelected { summary, info }
            }
            Err(e) => {
                self.selected = None;
                RouteEvent::RoutingError(e.to_string())
            }
        }
    }

    /// Line for the current plan, styled for drawing
    pub fn route_line(&self) -> Option<RouteLine> {
        self.waypoints()
            .map(|points| RouteLine::new("route".to_string(), points, self.line_style.clone()))
    }
}
