//! services/navigator/src/scenario.rs
//!
//! A recorded ride: where it starts, where it ends, and the fixes the device
//! reported along the way.

use ride_nav_core::{Coordinate, Location};
use serde::Deserialize;
use std::path::Path;

use crate::error::NavigatorError;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub pickup: Location,
    pub dropoff: Location,
    #[serde(default)]
    pub fixes: Vec<Coordinate>,
}

impl Scenario {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, NavigatorError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parses a scenario, rejecting pickup or dropoff outside valid ranges.
    pub fn from_json(raw: &str) -> Result<Self, NavigatorError> {
        let scenario: Scenario = serde_json::from_str(raw)?;
        for endpoint in [&scenario.pickup, &scenario.dropoff] {
            Coordinate::new(endpoint.latitude(), endpoint.longitude())?;
        }
        Ok(scenario)
    }
}
