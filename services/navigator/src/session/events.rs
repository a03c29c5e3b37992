//! services/navigator/src/session/events.rs
//!
//! Defines the messages exchanged between a navigation session and the
//! presentation code that drives it.

use ride_nav_core::{RouteInstruction, Trip};
use serde::Serialize;
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Session TO the Presentation Layer
//=========================================================================================

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationEvent {
    /// Refreshed after every processed fix.
    Progress {
        instruction_index: usize,
        /// The instruction at `instruction_index` on the route in force.
        instruction: Option<RouteInstruction>,
        distance_to_next: f64,
        distance_to_destination: f64,
    },

    /// A reroute replaced the route; totals in meters and seconds.
    RouteReplaced {
        distance: f64,
        duration: f64,
        instructions: usize,
    },

    /// The rider reached the dropoff. Fires once per arrival; the UI should
    /// prompt the user to end the trip.
    Arrived { trip_id: Uuid },

    /// A reroute started (`true`) or its cooldown finished (`false`).
    RerouteStatusChanged { rerouting: bool },

    /// The trip was ended and is now immutable.
    TripCompleted { trip: Trip },
}

//=========================================================================================
// Messages Sent FROM the Presentation Layer TO the Session
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// End the trip now, from any state.
    EndTrip,
}
