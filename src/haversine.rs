//! Great-circle distance helpers (fallback when no directions service is
//! available).
//!
//! Ignores roads, so it underestimates driven distance, but it is always
//! available and good enough to seed a `distance_km` trip feature.

use crate::traits::Coordinate;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates in kilometers.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Total route length in kilometers, summed over consecutive legs.
pub fn route_km(stops: &[Coordinate]) -> f64 {
    stops
        .windows(2)
        .map(|leg| haversine_km(leg[0], leg[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let vegas = Coordinate::new(-115.1, 36.1);
        let dist = haversine_km(vegas, vegas);
        assert!(dist < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_haversine_known_distance() {
        // Las Vegas to Los Angeles, actual distance ~370 km
        let vegas = Coordinate::new(-115.14, 36.17);
        let la = Coordinate::new(-118.24, 34.05);
        let dist = haversine_km(vegas, la);
        assert!(dist > 350.0 && dist < 400.0, "LV to LA should be ~370km, got {}", dist);
    }

    #[test]
    fn test_route_km_sums_legs() {
        let a = Coordinate::new(-115.10, 36.10);
        let b = Coordinate::new(-115.20, 36.20);
        let c = Coordinate::new(-115.30, 36.30);
        let total = route_km(&[a, b, c]);
        let legs = haversine_km(a, b) + haversine_km(b, c);
        assert!((total - legs).abs() < 1e-9);
    }

    #[test]
    fn test_route_km_single_stop_is_zero() {
        let only = Coordinate::new(-115.1, 36.1);
        assert_eq!(route_km(&[only]), 0.0);
    }
}
