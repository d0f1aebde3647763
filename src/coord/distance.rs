//! Great-circle distance
//!
//! Straight-line ("Luftlinie") distance between two coordinates. No road
//! network is involved anywhere in this crate.

use crate::constants::geo::EARTH_RADIUS_KM;
use crate::coord::Coordinates;
use std::f64::consts::PI;

/// Calculate the distance between two points in kilometers (Haversine formula)
///
/// # Arguments
/// * `a` - First point
/// * `b` - Second point
///
/// # Returns
/// Distance in kilometers, always >= 0 for finite inputs
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat * PI / 180.0;
    let lat2 = b.lat * PI / 180.0;
    let delta_lat = (b.lat - a.lat) * PI / 180.0;
    let delta_lng = (b.lng - a.lng) * PI / 180.0;

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);

    // Rounding can push h a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_KM * h.min(1.0).sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PARIS: Coordinates = Coordinates { lat: 48.85, lng: 2.35 };
    const NICE: Coordinates = Coordinates { lat: 43.70, lng: 7.27 };

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(distance_km(PARIS, PARIS), 0.0);
        assert_eq!(distance_km(Coordinates::zero(), Coordinates::zero()), 0.0);
    }

    #[test]
    fn test_symmetry() {
        assert_relative_eq!(distance_km(PARIS, NICE), distance_km(NICE, PARIS));
    }

    #[test]
    fn test_paris_to_nice() {
        let distance = distance_km(PARIS, NICE);
        assert!(
            (distance - 683.0).abs() < 683.0 * 0.05,
            "Distance {} should be approximately 683 km",
            distance
        );
    }

    #[test]
    fn test_one_degree_latitude() {
        let a = Coordinates::new(40.0, -74.0);
        let b = Coordinates::new(41.0, -74.0);
        assert_relative_eq!(distance_km(a, b), 111.19, epsilon = 0.1);
    }

    #[test]
    fn test_monotonic_for_small_offsets() {
        let mut previous = 0.0;
        for step in 1..20 {
            let offset = step as f64 * 0.01;
            let d = distance_km(PARIS, Coordinates::new(PARIS.lat + offset, PARIS.lng + offset));
            assert!(d > previous, "{} should exceed {}", d, previous);
            previous = d;
        }
    }

    #[test]
    fn test_antipodal_points() {
        let d = distance_km(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 180.0));
        assert_relative_eq!(d, PI * EARTH_RADIUS_KM, epsilon = 1e-6);
    }
}
