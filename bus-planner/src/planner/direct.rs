//! Direct-trip planning on a single line.
//!
//! For one line, pick the boarding and alighting stops that give the most
//! balanced walking plan. This is a bounded brute-force scan over
//! `k_board × k_dest` candidate pairs, not a shortest-path search: lines are
//! simple ordered sequences.

use std::cmp::Ordering;
use std::ops::Range;

use tracing::trace;

use crate::domain::{
    BusLeg, Coord, DirectPlan, Direction, DistanceProvider, LegMetrics, ScoreWeights, Topology,
    TravelDirection,
};

use super::candidates::nearest_k_where;
use super::config::{PlannerConfig, RadiusLevel};
use super::network::Route;
use super::rank::compare_legs;
use super::traversal::{stops_between, traversal_distance, traversed_indices};

/// Parameters for one direct-trip evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectParams {
    /// Maximum walk from the start point to the boarding stop (metres).
    pub board_ceiling_m: f64,
    /// Maximum walk from the alighting stop to the end point (metres).
    pub alight_ceiling_m: f64,
    /// Boarding candidates considered.
    pub k_board: usize,
    /// Alighting candidates considered.
    pub k_dest: usize,
    /// Per-stop weight for the last tie-break (metres).
    pub penalty_per_stop_m: f64,
    /// Circular traversal safety bound (metres).
    pub circular_cutoff_m: f64,
}

impl DirectParams {
    /// Parameters for a radius level, with the remaining values from `config`.
    pub fn for_level(config: &PlannerConfig, level: &RadiusLevel) -> Self {
        Self::with_ceilings(config, level.board_m, level.alight_m)
    }

    /// Parameters with explicit ceilings.
    pub fn with_ceilings(config: &PlannerConfig, board_ceiling_m: f64, alight_ceiling_m: f64) -> Self {
        Self {
            board_ceiling_m,
            alight_ceiling_m,
            k_board: config.k_board,
            k_dest: config.k_dest,
            penalty_per_stop_m: config.penalty_per_stop_m,
            circular_cutoff_m: config.circular_cutoff_m,
        }
    }
}

/// The best feasible pair found so far.
#[derive(Debug, Clone)]
struct BestPair {
    board: usize,
    alight: usize,
    /// Direction sequence holding both stops
    sequence: Range<usize>,
    metrics: LegMetrics,
}

/// Plan a direct trip on one line from `from` to `to`.
///
/// Only physical (visible) stops are boarding or alighting candidates; every
/// stop contributes to the in-vehicle distance. A pair is rejected when
/// either walk exceeds its ceiling, when both stops carry different
/// direction tags, when board and alight are the same stop, or when the
/// traversal between them is infeasible. The ride is measured along the
/// direction sequence holding both stops, so a pair spanning two sequences
/// has no traversal.
///
/// Returns `None` when the line has fewer than two stops or no pair is
/// feasible.
pub fn plan_direct<D: DistanceProvider + ?Sized>(
    route: &Route,
    from: Coord,
    to: Coord,
    params: &DirectParams,
    weights: &ScoreWeights,
    distance: &D,
) -> Option<DirectPlan> {
    if route.len() < 2 {
        return None;
    }

    let stops = route.stops();
    let topology = route.topology();

    let boards = nearest_k_where(stops, from, params.k_board, distance, |s| s.visible);
    let alights = nearest_k_where(stops, to, params.k_dest, distance, |s| s.visible);

    let mut best: Option<BestPair> = None;

    for board in &boards {
        if board.distance_m > params.board_ceiling_m {
            continue;
        }

        for alight in &alights {
            if alight.distance_m > params.alight_ceiling_m {
                continue;
            }
            if alight.index == board.index {
                continue;
            }
            if board.stop.direction_conflicts(alight.stop) {
                continue;
            }
            // An untagged stop and a tagged one sit on different sequences
            let Some(sequence) = route
                .sequence_of(board.index)
                .filter(|seq| seq.contains(&alight.index))
            else {
                trace!(
                    line = %route.code(),
                    board = %board.stop.code,
                    alight = %alight.stop.code,
                    "Stops on different direction sequences, skipping pair"
                );
                continue;
            };
            let (from_rel, to_rel) = (board.index - sequence.start, alight.index - sequence.start);

            let Some(bus_distance_m) = traversal_distance(
                &route.coords()[sequence.clone()],
                from_rel,
                to_rel,
                topology,
                params.circular_cutoff_m,
                distance,
            ) else {
                trace!(
                    line = %route.code(),
                    board = board.index,
                    alight = alight.index,
                    "Traversal infeasible, skipping pair"
                );
                continue;
            };

            let metrics = LegMetrics {
                walk_to_board_m: board.distance_m,
                walk_to_alight_m: alight.distance_m,
                bus_distance_m,
                stop_count: stops_between(sequence.len(), from_rel, to_rel, topology),
            };

            let better = match &best {
                None => true,
                Some(current) => {
                    compare_legs(&metrics, &current.metrics, params.penalty_per_stop_m)
                        == Ordering::Less
                }
            };
            if better {
                best = Some(BestPair {
                    board: board.index,
                    alight: alight.index,
                    sequence,
                    metrics,
                });
            }
        }
    }

    let pair = best?;
    let board = stops[pair.board].clone();
    let alight = stops[pair.alight].clone();

    let direction = match board.direction {
        Some(Direction::Outbound) => TravelDirection::Outbound,
        Some(Direction::Return) => TravelDirection::Return,
        None if topology == Topology::OneWayCircular => TravelDirection::Circular,
        None if pair.alight >= pair.board => TravelDirection::Forward,
        None => TravelDirection::Backward,
    };

    let seq = &pair.sequence;
    let traversed = traversed_indices(
        seq.len(),
        pair.board - seq.start,
        pair.alight - seq.start,
        topology,
    )
    .into_iter()
    .map(|i| stops[seq.start + i].clone())
    .collect();

    let leg = BusLeg {
        line: route.line().clone(),
        board,
        alight,
        board_index: pair.board,
        alight_index: pair.alight,
        direction,
        traversed,
    };

    Some(DirectPlan::new(leg, from, to, pair.metrics, weights))
}

/// The best direct plan across several lines, by the same ladder used
/// within a line. Earlier routes win exact ties.
pub fn best_direct<'r, D, I>(
    routes: I,
    from: Coord,
    to: Coord,
    params: &DirectParams,
    weights: &ScoreWeights,
    distance: &D,
) -> Option<DirectPlan>
where
    D: DistanceProvider + ?Sized,
    I: IntoIterator<Item = &'r Route>,
{
    let mut best: Option<DirectPlan> = None;
    for route in routes {
        let Some(plan) = plan_direct(route, from, to, params, weights, distance) else {
            continue;
        };
        let better = match &best {
            None => true,
            Some(current) => {
                compare_legs(&plan.metrics, &current.metrics, params.penalty_per_stop_m)
                    == Ordering::Less
            }
        };
        if better {
            best = Some(plan);
        }
    }
    best
}
