//! Greedy nearest-neighbor visiting order.
//!
//! Orders a day's stops by repeatedly hopping to the closest remaining stop
//! under great-circle distance. Deterministic and explainable rather than
//! optimal: the tour is anchored at the first stop in input order, and ties
//! go to the earliest remaining stop.

use crate::traits::Locatable;

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two (lat, lng) points in kilometers.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Order stops by greedy nearest-neighbor, starting from the first stop in
/// input order. Returns a permutation of the input; 0 or 1 stops come back
/// unchanged.
///
/// Stops without real coordinates report the origin, which can yield huge
/// non-physical hops; that behavior is part of the contract (see the module
/// docs on `Appointment::coordinates`).
pub fn order_by_nearest<T: Locatable>(stops: Vec<T>) -> Vec<T> {
    if stops.len() <= 1 {
        return stops;
    }

    let mut remaining = stops;
    let mut ordered = Vec::with_capacity(remaining.len());
    ordered.push(remaining.remove(0));

    while !remaining.is_empty() {
        let current = ordered
            .last()
            .map(Locatable::coordinates)
            .unwrap_or((0.0, 0.0));

        let mut best = 0;
        let mut best_distance = f64::MAX;
        for (index, stop) in remaining.iter().enumerate() {
            let distance = haversine_km(current, stop.coordinates());
            if distance < best_distance {
                best_distance = distance;
                best = index;
            }
        }

        ordered.push(remaining.remove(best));
    }

    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Stop {
        id: i64,
        location: (f64, f64),
    }

    impl Locatable for Stop {
        fn coordinates(&self) -> (f64, f64) {
            self.location
        }
    }

    fn stop(id: i64, lat: f64, lng: f64) -> Stop {
        Stop {
            id,
            location: (lat, lng),
        }
    }

    #[test]
    fn haversine_same_point_is_zero() {
        let dist = haversine_km((36.1, -115.1), (36.1, -115.1));
        assert!(dist < 0.001);
    }

    #[test]
    fn haversine_known_distance() {
        // Las Vegas to Los Angeles, roughly 370 km.
        let dist = haversine_km((36.17, -115.14), (34.05, -118.24));
        assert!(dist > 350.0 && dist < 400.0, "got {dist}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let dist = haversine_km((0.0, 0.0), (1.0, 0.0));
        assert!((dist - 111.19).abs() < 0.1, "got {dist}");
    }

    #[test]
    fn empty_and_single_inputs_are_unchanged() {
        let empty: Vec<Stop> = Vec::new();
        assert!(order_by_nearest(empty).is_empty());

        let single = vec![stop(1, 10.0, 10.0)];
        assert_eq!(order_by_nearest(single.clone()), single);
    }

    #[test]
    fn nearest_neighbor_picks_closer_stop_first() {
        // From the (0,0) anchor, C at 0.5 degrees beats B at a full degree.
        let stops = vec![stop(1, 0.0, 0.0), stop(2, 0.0, 1.0), stop(3, 0.0, 0.5)];
        let ordered = order_by_nearest(stops);
        let ids: Vec<i64> = ordered.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn order_is_a_permutation() {
        let stops = vec![
            stop(1, 36.17, -115.14),
            stop(2, 36.02, -115.04),
            stop(3, 36.11, -115.30),
            stop(4, 36.25, -115.20),
            stop(5, 35.99, -115.10),
        ];
        let mut expected: Vec<i64> = stops.iter().map(|s| s.id).collect();
        let mut ids: Vec<i64> = order_by_nearest(stops).iter().map(|s| s.id).collect();
        expected.sort_unstable();
        ids.sort_unstable();
        assert_eq!(ids, expected);
    }

    #[test]
    fn ties_go_to_the_earlier_stop() {
        // B and C sit at the same distance from A; the stable scan keeps B
        // (first in input order) ahead of C.
        let stops = vec![stop(1, 0.0, 0.0), stop(2, 0.0, 1.0), stop(3, 0.0, -1.0)];
        let ids: Vec<i64> = order_by_nearest(stops).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
