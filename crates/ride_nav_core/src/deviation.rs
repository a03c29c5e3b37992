//! crates/ride_nav_core/src/deviation.rs
//!
//! Decides whether a live position has drifted off the planned route.

use crate::domain::{Coordinate, Location};
use crate::geo;

/// Default distance from the route, in meters, beyond which a reroute is due.
pub const DEFAULT_DEVIATION_THRESHOLD_M: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationMonitor {
    pub threshold_m: f64,
}

impl Default for DeviationMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_DEVIATION_THRESHOLD_M)
    }
}

impl DeviationMonitor {
    pub fn new(threshold_m: f64) -> Self {
        Self { threshold_m }
    }

    /// Distance to the nearest polyline vertex. Segments between vertices are
    /// not considered, so long straight segments overestimate the drift.
    pub fn distance_to_route(&self, location: &Location, polyline: &[Coordinate]) -> Option<f64> {
        polyline
            .iter()
            .map(|&vertex| geo::distance(location.coordinate, vertex))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// True when the nearest vertex is strictly farther than the threshold.
    /// An empty polyline never reports a deviation.
    pub fn is_deviated(&self, location: &Location, polyline: &[Coordinate]) -> bool {
        self.distance_to_route(location, polyline)
            .is_some_and(|distance| distance > self.threshold_m)
    }
}
