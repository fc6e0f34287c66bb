//! Topology-aware traversal along a line.
//!
//! Linear lines can be ridden either way between two indices. One-way
//! circular lines only advance, wrapping from the last stop to the first, so
//! the distance from `i` to `j` generally differs from `j` to `i`.

use crate::domain::{Coord, DistanceProvider, Topology};

/// In-vehicle distance from index `from` to index `to`.
///
/// Returns `None` when the traversal is infeasible: an index is out of
/// range, or a circular walk accumulates more than `cutoff_m`.
pub fn traversal_distance<D: DistanceProvider + ?Sized>(
    coords: &[Coord],
    from: usize,
    to: usize,
    topology: Topology,
    cutoff_m: f64,
    distance: &D,
) -> Option<f64> {
    let n = coords.len();
    if from >= n || to >= n {
        return None;
    }

    match topology {
        Topology::Linear => {
            let (lo, hi) = (from.min(to), from.max(to));
            let total: f64 = coords[lo..=hi]
                .windows(2)
                .map(|w| distance.distance(w[0], w[1]))
                .sum();
            total.is_finite().then_some(total)
        }
        Topology::OneWayCircular => {
            let mut idx = from;
            let mut total = 0.0;
            while idx != to {
                let next = (idx + 1) % n;
                total += distance.distance(coords[idx], coords[next]);
                if !total.is_finite() || total > cutoff_m {
                    return None;
                }
                idx = next;
            }
            Some(total)
        }
    }
}

/// Stops advanced between `from` and `to`.
pub fn stops_between(n: usize, from: usize, to: usize, topology: Topology) -> usize {
    match topology {
        Topology::Linear => from.abs_diff(to),
        Topology::OneWayCircular if n == 0 => 0,
        Topology::OneWayCircular => (to + n - from % n) % n,
    }
}

/// Indices visited from `from` to `to` inclusive, in travel order.
pub fn traversed_indices(n: usize, from: usize, to: usize, topology: Topology) -> Vec<usize> {
    if from >= n || to >= n {
        return Vec::new();
    }
    match topology {
        Topology::Linear if from <= to => (from..=to).collect(),
        Topology::Linear => (to..=from).rev().collect(),
        Topology::OneWayCircular => {
            let steps = stops_between(n, from, to, topology);
            (0..=steps).map(|k| (from + k) % n).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Haversine;

    const M_PER_DEG: f64 = 111_194.926_644_558_73;

    /// Points on a local grid near the equator, in metres.
    fn at(east_m: f64, north_m: f64) -> Coord {
        Coord::new(0.001 + north_m / M_PER_DEG, 0.001 + east_m / M_PER_DEG).unwrap()
    }

    fn square() -> Vec<Coord> {
        // 0 ── 1
        // │    │
        // 3 ── 2      sides of 1 km, but 3→0 is the same side as 1→2
        vec![at(0.0, 1000.0), at(1000.0, 1000.0), at(1000.0, 0.0), at(0.0, 0.0)]
    }

    #[test]
    fn linear_is_direction_agnostic() {
        let coords: Vec<Coord> = (0..5).map(|i| at(500.0 * i as f64, 0.0)).collect();
        let fwd = traversal_distance(&coords, 1, 3, Topology::Linear, 1e9, &Haversine).unwrap();
        let back = traversal_distance(&coords, 3, 1, Topology::Linear, 1e9, &Haversine).unwrap();
        assert!((fwd - 1000.0).abs() < 1.0);
        assert_eq!(fwd, back);
        assert_eq!(stops_between(5, 1, 3, Topology::Linear), 2);
        assert_eq!(stops_between(5, 3, 1, Topology::Linear), 2);
    }

    #[test]
    fn circular_wraps_forward() {
        let coords = square();
        // 3 → 0 → 1 is two sides
        let d = traversal_distance(&coords, 3, 1, Topology::OneWayCircular, 1e9, &Haversine).unwrap();
        assert!((d - 2000.0).abs() < 2.0, "got {d}");
        assert_eq!(traversed_indices(4, 3, 1, Topology::OneWayCircular), vec![3, 0, 1]);
        assert_eq!(stops_between(4, 3, 1, Topology::OneWayCircular), 2);
    }

    #[test]
    fn circular_is_asymmetric() {
        let coords: Vec<Coord> = vec![at(0.0, 0.0), at(100.0, 0.0), at(5000.0, 0.0), at(200.0, 300.0)];
        let there = traversal_distance(&coords, 0, 1, Topology::OneWayCircular, 1e9, &Haversine).unwrap();
        let back = traversal_distance(&coords, 1, 0, Topology::OneWayCircular, 1e9, &Haversine).unwrap();
        assert!((there - 100.0).abs() < 0.5);
        assert!(back > 9000.0);
        assert_eq!(stops_between(4, 1, 0, Topology::OneWayCircular), 3);
    }

    #[test]
    fn same_index_is_zero() {
        let coords = square();
        assert_eq!(
            traversal_distance(&coords, 2, 2, Topology::OneWayCircular, 1e9, &Haversine),
            Some(0.0)
        );
        assert_eq!(traversed_indices(4, 2, 2, Topology::OneWayCircular), vec![2]);
    }

    #[test]
    fn circular_cutoff_fails_closed() {
        let coords = square();
        assert_eq!(
            traversal_distance(&coords, 3, 2, Topology::OneWayCircular, 2500.0, &Haversine),
            None
        );
    }

    #[test]
    fn out_of_range_is_infeasible() {
        let coords = square();
        assert_eq!(traversal_distance(&coords, 0, 9, Topology::Linear, 1e9, &Haversine), None);
        assert!(traversed_indices(4, 0, 9, Topology::Linear).is_empty());
    }

    #[test]
    fn linear_backward_indices_reverse() {
        assert_eq!(traversed_indices(5, 3, 1, Topology::Linear), vec![3, 2, 1]);
        assert_eq!(traversed_indices(5, 1, 3, Topology::Linear), vec![1, 2, 3]);
    }
}
