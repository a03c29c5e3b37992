pub mod deviation;
pub mod domain;
pub mod geo;
pub mod ports;
pub mod projector;

pub use deviation::{DeviationMonitor, DEFAULT_DEVIATION_THRESHOLD_M};
pub use domain::{
    Coordinate, DomainError, Location, Maneuver, Route, RouteInstruction, Trip, TripStatus,
};
pub use geo::{distance, EARTH_RADIUS_M};
pub use ports::{
    PortError, PortResult, PositionStream, PositioningService, RoutingService, WatchOptions,
};
pub use projector::{instruction_anchor, project, Projection};
