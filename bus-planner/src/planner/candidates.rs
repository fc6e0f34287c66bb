//! Nearest-K candidate stop search.

use crate::domain::{Coord, Direction, DistanceProvider, Stop};

/// A stop ranked by distance from a query point.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Position of the stop in the slice that was searched.
    pub index: usize,
    pub stop: &'a Stop,
    pub distance_m: f64,
}

/// The `k` stops nearest to `point`, closest first.
///
/// Stops without a coordinate are excluded before ranking. When
/// `direction` is given, stops tagged with a different direction are
/// discarded; untagged stops are kept. `k` is clamped to at least 1.
/// Equal distances keep their input order.
pub fn nearest_k<'a, D: DistanceProvider + ?Sized>(
    stops: &'a [Stop],
    point: Coord,
    k: usize,
    direction: Option<Direction>,
    distance: &D,
) -> Vec<Candidate<'a>> {
    nearest_k_where(stops, point, k, distance, |stop| match (direction, stop.direction) {
        (Some(wanted), Some(actual)) => wanted == actual,
        _ => true,
    })
}

/// [`nearest_k`] with an arbitrary eligibility predicate.
pub fn nearest_k_where<'a, D, F>(
    stops: &'a [Stop],
    point: Coord,
    k: usize,
    distance: &D,
    eligible: F,
) -> Vec<Candidate<'a>>
where
    D: DistanceProvider + ?Sized,
    F: Fn(&Stop) -> bool,
{
    let mut ranked: Vec<Candidate<'a>> = stops
        .iter()
        .enumerate()
        .filter(|(_, stop)| eligible(stop))
        .filter_map(|(index, stop)| {
            let coord = stop.coord?;
            Some(Candidate {
                index,
                stop,
                distance_m: distance.distance(point, coord),
            })
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    ranked.truncate(k.max(1));
    ranked
}
