//! crates/ride_nav_core/src/domain.rs
//!
//! Defines the pure, core data structures for ride navigation.
//! These structs are independent of any routing engine or positioning backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Errors raised when domain values break their invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error("Route has no {0}")]
    EmptyRoute(&'static str),
}

//=========================================================================================
// Positions
//=========================================================================================

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate, rejecting values outside the valid lat/lon ranges.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(DomainError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    /// Whether latitude is within [-90, 90] and longitude within [-180, 180].
    /// NaN components are never valid.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A coordinate with an optional human-readable address.
///
/// Locations are replaced wholesale on update, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinate: Coordinate {
                latitude,
                longitude,
            },
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn latitude(&self) -> f64 {
        self.coordinate.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.coordinate.longitude
    }
}

impl From<Coordinate> for Location {
    fn from(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            address: None,
        }
    }
}

//=========================================================================================
// Routes
//=========================================================================================

/// The kind of maneuver a route instruction asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Maneuver {
    #[serde(alias = "depart")]
    Start,
    #[serde(alias = "continue")]
    Straight,
    TurnLeft,
    TurnRight,
    SlightLeft,
    SlightRight,
    SharpLeft,
    SharpRight,
    Arrive,
}

impl Maneuver {
    pub fn as_str(&self) -> &'static str {
        match self {
            Maneuver::Start => "start",
            Maneuver::Straight => "straight",
            Maneuver::TurnLeft => "turn-left",
            Maneuver::TurnRight => "turn-right",
            Maneuver::SlightLeft => "slight-left",
            Maneuver::SlightRight => "slight-right",
            Maneuver::SharpLeft => "sharp-left",
            Maneuver::SharpRight => "sharp-right",
            Maneuver::Arrive => "arrive",
        }
    }

    /// The glyph shown next to the instruction text.
    pub fn symbol(&self) -> &'static str {
        match self {
            Maneuver::Start => "🚀",
            Maneuver::Straight => "⬆️",
            Maneuver::TurnLeft => "⬅️",
            Maneuver::TurnRight => "➡️",
            Maneuver::SlightLeft => "↖️",
            Maneuver::SlightRight => "↗️",
            Maneuver::SharpLeft => "↩️",
            Maneuver::SharpRight => "↪️",
            Maneuver::Arrive => "🏁",
        }
    }
}

impl fmt::Display for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn-by-turn step, produced by the routing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInstruction {
    pub text: String,
    pub maneuver: Maneuver,
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_name: Option<String>,
}

/// A complete answer from one routing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub coordinates: Vec<Coordinate>,
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
    pub instructions: Vec<RouteInstruction>,
}

impl Route {
    /// Accepts the route only if it has both geometry and instructions.
    pub fn validate(self) -> Result<Self, DomainError> {
        if self.coordinates.is_empty() {
            return Err(DomainError::EmptyRoute("coordinates"));
        }
        if self.instructions.is_empty() {
            return Err(DomainError::EmptyRoute("instructions"));
        }
        Ok(self)
    }
}

//=========================================================================================
// Trips
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Pending,
    Active,
    Completed,
}

/// A ride from pickup to dropoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub pickup: Location,
    pub dropoff: Location,
    pub route: Option<Route>,
    pub status: TripStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl Trip {
    pub fn new(pickup: Location, dropoff: Location) -> Self {
        Self {
            id: Uuid::new_v4(),
            pickup,
            dropoff,
            route: None,
            status: TripStatus::Pending,
            start_time: None,
            end_time: None,
        }
    }

    /// Moves a pending trip to `Active` with its first route.
    pub fn activate(self, route: Route, now: DateTime<Utc>) -> Self {
        Self {
            route: Some(route),
            status: TripStatus::Active,
            start_time: Some(now),
            ..self
        }
    }

    /// Swaps in a new route wholesale, returning the previous one.
    pub fn replace_route(&mut self, route: Route) -> Option<Route> {
        self.route.replace(route)
    }

    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.status = TripStatus::Completed;
        self.end_time = Some(now);
    }

    pub fn is_completed(&self) -> bool {
        self.status == TripStatus::Completed
    }
}
