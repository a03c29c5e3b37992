//! services/navigator/src/adapters/fallback.rs
//!
//! Wraps a primary routing engine and answers with a straight-line route when
//! the primary cannot produce one.

use async_trait::async_trait;
use ride_nav_core::{Location, PortResult, Route, RoutingService};
use std::sync::Arc;
use tracing::warn;

use super::StraightLineRouter;

#[derive(Clone)]
pub struct FallbackRouter {
    primary: Arc<dyn RoutingService>,
    fallback: StraightLineRouter,
}

impl FallbackRouter {
    pub fn new(primary: Arc<dyn RoutingService>, fallback: StraightLineRouter) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl RoutingService for FallbackRouter {
    async fn calculate_route(&self, from: &Location, to: &Location) -> PortResult<Route> {
        match self.primary.calculate_route(from, to).await {
            Ok(route) => match route.validate() {
                Ok(route) => Ok(route),
                Err(e) => {
                    warn!("Primary engine returned an unusable route ({}), using straight line.", e);
                    Ok(self.fallback.route(from, to))
                }
            },
            Err(e) => {
                warn!("Primary engine failed ({}), using straight line.", e);
                Ok(self.fallback.route(from, to))
            }
        }
    }
}
