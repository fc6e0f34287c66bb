//! Planning entry point.
//!
//! Loads a per-request snapshot of the network from a repository, then runs
//! the progressive radius search over it. Repository reads are the only
//! suspension points; the planning itself is pure and synchronous.

use std::collections::BTreeMap;

use futures::future::{join_all, try_join};
use tracing::{debug, info, warn};

use crate::domain::{AreaContext, Category, Coord, DistanceProvider, Line, LineCode, Plan};
use crate::repository::{RepositoryError, StopRepository};

use super::config::PlannerConfig;
use super::network::{Network, Route};
use super::radius::progressive_compose;

/// Error from journey planning.
///
/// "No plan found" is not an error; see [`PlanOutcome::plan`].
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Failed to read lines or stops
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Invalid planning request
    #[error("invalid plan request: {0}")]
    InvalidRequest(String),
}

/// Request for a journey plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    /// Where the rider is.
    pub origin: Coord,

    /// Where the rider wants to go.
    pub destination: Coord,

    /// Area the origin lies in, used to select lines and transfer rules.
    pub origin_area: AreaContext,

    /// Area the destination lies in.
    pub destination_area: AreaContext,
}

impl PlanRequest {
    /// Create a request with no area context.
    pub fn new(origin: Coord, destination: Coord) -> Self {
        Self {
            origin,
            destination,
            origin_area: AreaContext::anywhere(),
            destination_area: AreaContext::anywhere(),
        }
    }

    /// Set the origin and destination areas.
    pub fn with_areas(mut self, origin_area: AreaContext, destination_area: AreaContext) -> Self {
        self.origin_area = origin_area;
        self.destination_area = destination_area;
        self
    }
}

/// Result of a planning call.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// The chosen plan, or `None` if nothing is feasible at any radius level.
    pub plan: Option<Plan>,

    /// Index of the radius level that produced the plan.
    pub radius_level: Option<usize>,

    /// Operating lines loaded for this request.
    pub lines_considered: usize,
}

impl PlanOutcome {
    /// An outcome with no plan.
    pub fn empty(lines_considered: usize) -> Self {
        Self {
            plan: None,
            radius_level: None,
            lines_considered,
        }
    }
}

/// Journey planner over a repository.
pub struct Planner<'a, R: StopRepository, D: DistanceProvider + ?Sized> {
    repository: &'a R,
    distance: &'a D,
    config: &'a PlannerConfig,
}

impl<'a, R: StopRepository, D: DistanceProvider + ?Sized> Planner<'a, R, D> {
    /// Create a new planner.
    pub fn new(repository: &'a R, distance: &'a D, config: &'a PlannerConfig) -> Self {
        Self {
            repository,
            distance,
            config,
        }
    }

    /// Plan a journey.
    ///
    /// Repository failures are returned as [`PlanError::Repository`]; an
    /// empty network or no feasible plan is `Ok` with `plan: None`.
    pub async fn plan(&self, request: &PlanRequest) -> Result<PlanOutcome, PlanError> {
        if self.config.radius_levels.is_empty() {
            return Err(PlanError::InvalidRequest(
                "no radius levels configured".to_string(),
            ));
        }

        let network = self.load_network(request).await?;
        let lines_considered = network.line_count();
        if lines_considered == 0 {
            debug!("No operating lines for request");
            return Ok(PlanOutcome::empty(0));
        }

        let outcome = match progressive_compose(&network, request, self.config, self.distance) {
            Some((level, plan)) => PlanOutcome {
                plan: Some(plan),
                radius_level: Some(level),
                lines_considered,
            },
            None => PlanOutcome::empty(lines_considered),
        };

        info!(
            lines = lines_considered,
            found = outcome.plan.is_some(),
            level = ?outcome.radius_level,
            transfers = outcome.plan.as_ref().map(Plan::transfers),
            "Planning complete"
        );
        Ok(outcome)
    }

    /// Load both categories' operating lines and their stops.
    pub async fn load_network(&self, request: &PlanRequest) -> Result<Network, PlanError> {
        let (urban, rural) = try_join(
            self.load_routes(Category::Urban, request),
            self.load_routes(Category::Rural, request),
        )
        .await?;
        Ok(Network::new(urban, rural))
    }

    async fn load_routes(
        &self,
        category: Category,
        request: &PlanRequest,
    ) -> Result<Vec<Route>, PlanError> {
        let lines = self.lines_for(category, request).await?;

        let mut routes = Vec::with_capacity(lines.len());
        for batch in lines.chunks(self.config.fetch_batch_size.max(1)) {
            let futures: Vec<_> = batch
                .iter()
                .map(|line| async move {
                    let result = self.repository.fetch_stops(&line.code).await;
                    (line, result)
                })
                .collect();

            for (line, result) in join_all(futures).await {
                match result {
                    Ok(stops) => {
                        let route = Route::new(line.clone(), stops);
                        if route.len() < 2 {
                            debug!(line = %line.code, stops = route.len(), "Line has too few stops");
                        }
                        routes.push(route);
                    }
                    Err(e) => {
                        warn!(line = %line.code, error = %e, "Failed to fetch stops");
                        return Err(e.into());
                    }
                }
            }
        }

        debug!(
            category = category.as_str(),
            routes = routes.len(),
            "Loaded routes"
        );
        Ok(routes)
    }

    /// Operating lines of `category` serving either end of the trip, by code.
    async fn lines_for(
        &self,
        category: Category,
        request: &PlanRequest,
    ) -> Result<Vec<Line>, PlanError> {
        let mut areas = vec![&request.origin_area];
        if request.destination_area != request.origin_area {
            areas.push(&request.destination_area);
        }

        let mut by_code: BTreeMap<LineCode, Line> = BTreeMap::new();
        for area in areas {
            let lines = self
                .repository
                .fetch_lines(category, area)
                .await
                .inspect_err(|e| warn!(category = category.as_str(), error = %e, "Failed to fetch lines"))?;
            for line in lines {
                if !line.operating {
                    debug!(line = %line.code, "Skipping non-operating line");
                    continue;
                }
                by_code.entry(line.code.clone()).or_insert(line);
            }
        }
        Ok(by_code.into_values().collect())
    }
}
