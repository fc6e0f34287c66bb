//! One-transfer composition between the urban and rural categories.
//!
//! When no line reaches close enough to the destination, a trip is built
//! from two direct legs on different categories joined by a short walk at a
//! transfer stop. Both orderings (urban then rural, rural then urban) are
//! evaluated and the lower-scoring one is kept.

use tracing::{debug, trace};

use crate::domain::{
    Category, Coord, DirectPlan, DistanceProvider, LineCode, Plan, Stop, TransferPlan,
};

use super::config::{PlannerConfig, RadiusLevel};
use super::direct::{DirectParams, best_direct};
use super::network::{Network, Route};
use super::rank::best_plan;
use super::search::PlanRequest;

/// A stop considered as the interchange point, ranked by its distance to
/// the destination.
#[derive(Debug, Clone, Copy)]
struct PoolEntry<'n> {
    route: &'n Route,
    /// Position of `stop` in `route`
    index: usize,
    stop: &'n Stop,
    coord: Coord,
    distance_m: f64,
}

/// Compose the best plan at one radius level.
///
/// A direct plan alighting within `near_destination_m` of the destination is
/// accepted straight away. Otherwise the best direct plan and the best
/// transfer plan compete on score, the direct plan winning ties.
pub fn compose<D: DistanceProvider + ?Sized>(
    network: &Network,
    request: &PlanRequest,
    level: &RadiusLevel,
    config: &PlannerConfig,
    distance: &D,
) -> Option<Plan> {
    let params = DirectParams::for_level(config, level);

    let directs: Vec<DirectPlan> = Category::ALL
        .iter()
        .filter_map(|category| {
            best_direct(
                network.routes(*category),
                request.origin,
                request.destination,
                &params,
                &config.weights,
                distance,
            )
        })
        .collect();

    let near = directs
        .iter()
        .filter(|p| p.metrics.walk_to_alight_m <= config.near_destination_m)
        .cloned()
        .map(Plan::Direct)
        .collect::<Vec<_>>();
    if let Some(plan) = best_plan(near) {
        debug!(
            line = %plan.bus_legs()[0].line.code,
            score = plan.score(),
            "Direct plan ends near destination, skipping transfers"
        );
        return Some(plan);
    }

    let mut candidates: Vec<Plan> = directs.into_iter().map(Plan::Direct).collect();
    if let Some(transfer) = best_transfer(network, request, level, config, distance) {
        candidates.push(Plan::Transfer(transfer));
    }
    best_plan(candidates)
}

/// The best one-transfer plan over both category orderings.
pub fn best_transfer<D: DistanceProvider + ?Sized>(
    network: &Network,
    request: &PlanRequest,
    level: &RadiusLevel,
    config: &PlannerConfig,
    distance: &D,
) -> Option<TransferPlan> {
    let allow_list = config
        .transfer_rules
        .urban_allow_list(&request.origin_area, &request.destination_area);

    let mut best: Option<TransferPlan> = None;
    for first in Category::ALL {
        let Some(plan) = transfer_for_ordering(
            network,
            request,
            level,
            config,
            allow_list.as_deref(),
            first,
            distance,
        ) else {
            continue;
        };
        let better = best
            .as_ref()
            .is_none_or(|current| plan.score().total_cmp(&current.score()).is_lt());
        if better {
            best = Some(plan);
        }
    }
    best
}

/// Routes of `category` usable in a transfer leg.
fn eligible_routes<'n>(
    network: &'n Network,
    category: Category,
    allow_list: Option<&[LineCode]>,
) -> Vec<&'n Route> {
    network
        .routes(category)
        .iter()
        .filter(|route| match (category, allow_list) {
            (Category::Urban, Some(codes)) => codes.contains(route.code()),
            _ => true,
        })
        .collect()
}

/// Visible stops of `routes` near the destination, best interchange first.
///
/// Stops are ranked by distance bucket; within a bucket terminals come first
/// when configured, then exact distance.
fn transfer_pool<'n, D: DistanceProvider + ?Sized>(
    routes: &[&'n Route],
    destination: Coord,
    config: &PlannerConfig,
    distance: &D,
) -> Vec<PoolEntry<'n>> {
    let mut pool: Vec<PoolEntry<'n>> = routes
        .iter()
        .flat_map(|&route| {
            route
                .stops()
                .iter()
                .enumerate()
                .map(move |(index, stop)| (route, index, stop))
        })
        .filter(|(_, _, stop)| stop.visible)
        .filter_map(|(route, index, stop)| {
            let coord = stop.coord?;
            let distance_m = distance.distance(coord, destination);
            (distance_m.is_finite() && distance_m <= config.transfer_pool_max_m).then_some(
                PoolEntry {
                    route,
                    index,
                    stop,
                    coord,
                    distance_m,
                },
            )
        })
        .collect();

    let bucket_m = config.transfer_rank_bucket_m.max(1.0);
    let terminals_first = config.transfer_rules.terminals_first;
    pool.sort_by(|a, b| {
        let bucket_a = (a.distance_m / bucket_m).floor();
        let bucket_b = (b.distance_m / bucket_m).floor();
        bucket_a
            .total_cmp(&bucket_b)
            .then_with(|| {
                if terminals_first {
                    b.stop.terminal.cmp(&a.stop.terminal)
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .then_with(|| a.distance_m.total_cmp(&b.distance_m))
    });
    pool.truncate(config.transfer_pool_size.max(1));
    pool
}

/// The best transfer plan riding `first` then its other category.
fn transfer_for_ordering<D: DistanceProvider + ?Sized>(
    network: &Network,
    request: &PlanRequest,
    level: &RadiusLevel,
    config: &PlannerConfig,
    allow_list: Option<&[LineCode]>,
    first: Category,
    distance: &D,
) -> Option<TransferPlan> {
    let second = first.other();
    let first_routes = eligible_routes(network, first, allow_list);
    let second_routes = eligible_routes(network, second, allow_list);
    if first_routes.is_empty() || second_routes.is_empty() {
        return None;
    }

    let pool = transfer_pool(&second_routes, request.destination, config, distance);
    debug!(
        first = first.as_str(),
        second = second.as_str(),
        pool = pool.len(),
        "Evaluating transfer ordering"
    );

    let to_transfer =
        DirectParams::with_ceilings(config, level.board_m, config.transfer_ceiling_m);
    let from_transfer =
        DirectParams::with_ceilings(config, config.transfer_ceiling_m, level.alight_m);

    let mut best: Option<TransferPlan> = None;
    for entry in pool {
        let Some(second_leg) = best_direct(
            [entry.route],
            entry.coord,
            request.destination,
            &from_transfer,
            &config.weights,
            distance,
        ) else {
            trace!(stop = %entry.stop.code, "No onward leg from transfer stop");
            continue;
        };
        // The onward leg must start at the interchange itself
        if second_leg.leg.board_index != entry.index {
            trace!(
                stop = %entry.stop.code,
                boards = %second_leg.leg.board.code,
                "Onward leg boards elsewhere"
            );
            continue;
        }

        let Some(first_leg) = best_direct(
            first_routes.iter().copied(),
            request.origin,
            entry.coord,
            &to_transfer,
            &config.weights,
            distance,
        ) else {
            trace!(stop = %entry.stop.code, "No leg reaches transfer stop");
            continue;
        };

        let (Some(alight), Some(board)) = (first_leg.leg.alight.coord, second_leg.leg.board.coord)
        else {
            continue;
        };
        let transfer_walk_m = distance.distance(alight, board);
        if !transfer_walk_m.is_finite() || transfer_walk_m > config.transfer_ceiling_m {
            trace!(
                stop = %entry.stop.code,
                walk_m = transfer_walk_m,
                "Transfer walk exceeds ceiling"
            );
            continue;
        }

        let plan = TransferPlan::new(
            first_leg,
            second_leg,
            entry.stop.clone(),
            transfer_walk_m,
            &config.weights,
        );
        let better = best
            .as_ref()
            .is_none_or(|current| plan.score().total_cmp(&current.score()).is_lt());
        if better {
            best = Some(plan);
        }
    }
    best
}
