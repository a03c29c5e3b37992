//! crates/ride_nav_core/src/projector.rs
//!
//! Finds the turn-by-turn instruction closest to a live position.

use crate::domain::{Coordinate, Location, Route};
use crate::geo;

/// The instruction nearest to the current position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub instruction_index: usize,
    /// Meters from the position to the instruction's anchor coordinate.
    pub distance_to_anchor: f64,
}

/// The geometry coordinate standing in for instruction `index`.
///
/// Instructions and geometry are not guaranteed to be the same length, so the
/// index is clamped to the last coordinate.
pub fn instruction_anchor(route: &Route, index: usize) -> Option<Coordinate> {
    let last = route.coordinates.len().checked_sub(1)?;
    route.coordinates.get(index.min(last)).copied()
}

/// Linear scan over all instruction anchors; the lowest index wins ties.
///
/// Returns `None` when the route has no instructions or no geometry.
pub fn project(location: &Location, route: &Route) -> Option<Projection> {
    let mut best: Option<Projection> = None;

    for index in 0..route.instructions.len() {
        let anchor = instruction_anchor(route, index)?;
        let distance = geo::distance(location.coordinate, anchor);

        match best {
            Some(ref current) if distance >= current.distance_to_anchor => {}
            _ => {
                best = Some(Projection {
                    instruction_index: index,
                    distance_to_anchor: distance,
                })
            }
        }
    }

    best
}
