//! services/navigator/src/adapters/recorded.rs
//!
//! A routing engine that replays previously recorded engine responses in order.
//! Used to drive the navigator from captured data instead of a live engine.

use async_trait::async_trait;
use ride_nav_core::{Location, PortError, PortResult, Route, RoutingService};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use crate::error::NavigatorError;

#[derive(Debug, Default)]
pub struct RecordedRouter {
    routes: Mutex<VecDeque<Route>>,
}

impl RecordedRouter {
    pub fn new(routes: impl IntoIterator<Item = Route>) -> Self {
        Self {
            routes: Mutex::new(routes.into_iter().collect()),
        }
    }

    /// Loads a JSON array of routes.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, NavigatorError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let routes: Vec<Route> = serde_json::from_str(&raw)?;
        debug!(
            "Loaded {} recorded routes from {}",
            routes.len(),
            path.as_ref().display()
        );
        Ok(Self::new(routes))
    }
}

#[async_trait]
impl RoutingService for RecordedRouter {
    /// Returns the next recorded route, regardless of the requested endpoints.
    async fn calculate_route(&self, _from: &Location, _to: &Location) -> PortResult<Route> {
        let mut routes = self
            .routes
            .lock()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let route = routes
            .pop_front()
            .ok_or_else(|| PortError::NotFound("no recorded route left".to_string()))?;
        debug!("Replaying recorded route, {} left.", routes.len());
        Ok(route)
    }
}
