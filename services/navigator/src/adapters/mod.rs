pub mod fallback;
pub mod recorded;
pub mod replay;
pub mod straight_line;

pub use fallback::FallbackRouter;
pub use recorded::RecordedRouter;
pub use replay::ReplayPositioning;
pub use straight_line::StraightLineRouter;

use crate::config::{Config, RoutingEngineKind};
use crate::error::NavigatorError;
use ride_nav_core::RoutingService;
use std::sync::Arc;

/// Builds the routing engine selected in the configuration.
///
/// Every engine except the straight line is wrapped in a [`FallbackRouter`].
pub fn routing_engine(config: &Config) -> Result<Arc<dyn RoutingService>, NavigatorError> {
    let straight_line = StraightLineRouter::new(config.fallback_speed_mps);
    let engine: Arc<dyn RoutingService> = match &config.routing_engine {
        RoutingEngineKind::StraightLine => Arc::new(straight_line),
        RoutingEngineKind::Recorded { routes_path } => Arc::new(FallbackRouter::new(
            Arc::new(RecordedRouter::from_file(routes_path)?),
            straight_line,
        )),
    };
    Ok(engine)
}
