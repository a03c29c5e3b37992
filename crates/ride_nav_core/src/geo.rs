//! crates/ride_nav_core/src/geo.rs
//!
//! Great-circle distance on a spherical Earth.

use crate::domain::{Coordinate, Location};

/// Earth radius used for all distance computations, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculates the great-circle distance between two positions using the
/// [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
/// Returns the result in meters.
///
/// NaN components propagate to a NaN result.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let sin_dphi_half = (d_phi * 0.5).sin();
    let sin_dlambda_half = (d_lambda * 0.5).sin();

    let h = sin_dphi_half * sin_dphi_half
        + phi1.cos() * phi2.cos() * sin_dlambda_half * sin_dlambda_half;
    // Rounding can push h slightly past 1 for antipodal points. `clamp` keeps NaN.
    let h = h.clamp(0.0, 1.0);

    EARTH_RADIUS_M * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

impl Location {
    /// Distance in meters to another location.
    pub fn distance_to(&self, other: &Location) -> f64 {
        distance(self.coordinate, other.coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate {
            latitude,
            longitude,
        }
    }

    #[test]
    fn coincident_points_are_zero() {
        for point in [c(0.0, 0.0), c(25.2048, 55.2708), c(-89.9, 179.9), c(90.0, -180.0)] {
            assert!(distance(point, point).abs() <= 1e-6);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (c(25.2048, 55.2708), c(24.4539, 54.3773)),
            (c(-33.86, 151.21), c(51.5, -0.12)),
            (c(0.0, 179.5), c(0.0, -179.5)),
        ];
        for (a, b) in pairs {
            assert!((distance(a, b) - distance(b, a)).abs() < 1e-6);
        }
    }

    #[test]
    fn dubai_to_abu_dhabi() {
        let d = distance(c(25.2048, 55.2708), c(24.4539, 54.3773));
        assert!((d - 122_889.4).abs() < 1.0, "got {d}");
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let d = distance(c(0.0, 0.0), c(0.0, 180.0));
        let expected = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!((d - expected).abs() < 1e-3);
        assert!(!distance(c(90.0, 0.0), c(-90.0, 0.0)).is_nan());
    }

    #[test]
    fn nan_propagates() {
        assert!(distance(c(f64::NAN, 0.0), c(0.0, 0.0)).is_nan());
        assert!(distance(c(0.0, 0.0), c(10.0, f64::NAN)).is_nan());
        assert!(Location::new(f64::NAN, f64::NAN)
            .distance_to(&Location::new(0.0, 0.0))
            .is_nan());
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = distance(c(0.0, 0.0), c(1.0, 0.0));
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
    }
}
