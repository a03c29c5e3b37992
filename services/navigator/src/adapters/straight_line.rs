//! services/navigator/src/adapters/straight_line.rs
//!
//! A routing engine that answers every request with a direct line between the
//! two locations. It needs no offline dataset, which makes it the last resort
//! when the real engine cannot produce a route.

use async_trait::async_trait;
use ride_nav_core::{
    distance, Location, Maneuver, PortResult, Route, RouteInstruction, RoutingService,
};

/// Share of the trip at which the "head towards" instruction is placed.
const MIDWAY_FRACTION: f64 = 0.8;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone, Debug)]
pub struct StraightLineRouter {
    speed_mps: f64,
}

impl Default for StraightLineRouter {
    fn default() -> Self {
        Self { speed_mps: 10.0 }
    }
}

impl StraightLineRouter {
    pub fn new(speed_mps: f64) -> Self {
        Self { speed_mps }
    }

    /// Builds the direct route synchronously; never fails.
    pub fn route(&self, from: &Location, to: &Location) -> Route {
        let meters = distance(from.coordinate, to.coordinate);
        let seconds = meters / self.speed_mps;
        let destination = to.address.as_deref().unwrap_or("your destination");

        Route {
            coordinates: vec![from.coordinate, to.coordinate],
            distance: meters,
            duration: seconds,
            instructions: vec![
                RouteInstruction {
                    text: "Start your journey".to_string(),
                    maneuver: Maneuver::Start,
                    distance: 0.0,
                    duration: 0.0,
                    street_name: from.address.clone(),
                },
                RouteInstruction {
                    text: format!("Head towards {}", destination),
                    maneuver: Maneuver::Straight,
                    distance: meters * MIDWAY_FRACTION,
                    duration: seconds * MIDWAY_FRACTION,
                    street_name: None,
                },
                RouteInstruction {
                    text: "You have arrived at your destination".to_string(),
                    maneuver: Maneuver::Arrive,
                    distance: meters,
                    duration: seconds,
                    street_name: to.address.clone(),
                },
            ],
        }
    }
}

//=========================================================================================
// `RoutingService` Trait Implementation
//=========================================================================================

#[async_trait]
impl RoutingService for StraightLineRouter {
    async fn calculate_route(&self, from: &Location, to: &Location) -> PortResult<Route> {
        Ok(self.route(from, to))
    }
}
