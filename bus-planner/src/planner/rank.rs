//! Plan ranking.
//!
//! Two orderings are used. Candidate board/alight pairs on one line are
//! compared with a lexicographic minimax ladder that favours balanced walks.
//! Whole plans (direct or transfer) are compared by their scalar score.

use std::cmp::Ordering;

use crate::domain::{LegMetrics, Plan};

/// Compare two candidate legs.
///
/// In strict priority order:
/// 1. Smaller longer-walk (minimax)
/// 2. Smaller total walk
/// 3. Shorter in-vehicle distance
/// 4. Fewer stops traversed
/// 5. Smaller composite of walks, ride and per-stop penalty
///
/// `Less` means `a` is better.
pub fn compare_legs(a: &LegMetrics, b: &LegMetrics, penalty_per_stop_m: f64) -> Ordering {
    let max_cmp = a.max_walk_m().total_cmp(&b.max_walk_m());
    if max_cmp != Ordering::Equal {
        return max_cmp;
    }

    let sum_cmp = a.total_walk_m().total_cmp(&b.total_walk_m());
    if sum_cmp != Ordering::Equal {
        return sum_cmp;
    }

    let bus_cmp = a.bus_distance_m.total_cmp(&b.bus_distance_m);
    if bus_cmp != Ordering::Equal {
        return bus_cmp;
    }

    let stops_cmp = a.stop_count.cmp(&b.stop_count);
    if stops_cmp != Ordering::Equal {
        return stops_cmp;
    }

    a.composite_m(penalty_per_stop_m)
        .total_cmp(&b.composite_m(penalty_per_stop_m))
}

/// Compare two plans: lower score first, then fewer transfers.
pub fn compare_plans(a: &Plan, b: &Plan) -> Ordering {
    let score_cmp = a.score().total_cmp(&b.score());
    if score_cmp != Ordering::Equal {
        return score_cmp;
    }
    a.transfers().cmp(&b.transfers())
}

/// Rank plans best-first. The sort is stable.
pub fn rank_plans(mut plans: Vec<Plan>) -> Vec<Plan> {
    plans.sort_by(compare_plans);
    plans
}

/// The best plan, or `None` if there are none.
pub fn best_plan(plans: Vec<Plan>) -> Option<Plan> {
    rank_plans(plans).into_iter().next()
}
