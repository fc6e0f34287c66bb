//! Progressive radius search.
//!
//! Walking ceilings are widened level by level and the search stops at the
//! first level that yields any plan, so short walks are preferred over a
//! globally lower score found further out.

use tracing::debug;

use crate::domain::{Coord, DirectPlan, DistanceProvider, Plan};

use super::config::{PlannerConfig, RadiusLevel};
use super::direct::{DirectParams, best_direct};
use super::multimodal::compose;
use super::network::{Network, Route};
use super::search::PlanRequest;

/// Run `attempt` on each level in order and return the first hit with its
/// level index.
pub fn search_levels<T, F>(levels: &[RadiusLevel], mut attempt: F) -> Option<(usize, T)>
where
    F: FnMut(&RadiusLevel) -> Option<T>,
{
    for (index, level) in levels.iter().enumerate() {
        if let Some(found) = attempt(level) {
            debug!(
                level = index,
                board_m = level.board_m,
                alight_m = level.alight_m,
                "Radius level produced a plan"
            );
            return Some((index, found));
        }
        debug!(level = index, "No plan at radius level");
    }
    None
}

/// Direct plan over `routes`, widening ceilings until one is feasible.
pub fn progressive_direct<'r, D, I>(
    routes: I,
    from: Coord,
    to: Coord,
    config: &PlannerConfig,
    distance: &D,
) -> Option<(usize, DirectPlan)>
where
    D: DistanceProvider + ?Sized,
    I: IntoIterator<Item = &'r Route> + Clone,
{
    search_levels(&config.radius_levels, |level| {
        let params = DirectParams::for_level(config, level);
        best_direct(routes.clone(), from, to, &params, &config.weights, distance)
    })
}

/// Full composition (direct or one transfer), widening ceilings until a
/// plan appears.
pub fn progressive_compose<D: DistanceProvider + ?Sized>(
    network: &Network,
    request: &PlanRequest,
    config: &PlannerConfig,
    distance: &D,
) -> Option<(usize, Plan)> {
    search_levels(&config.radius_levels, |level| {
        compose(network, request, level, config, distance)
    })
}
