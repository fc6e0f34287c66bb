//! Application state for the web layer.

use std::sync::Arc;

use crate::domain::Haversine;
use crate::planner::PlannerConfig;
use crate::repository::{CachedRepository, RepositoryBackend};

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Cached line and stop repository
    pub repository: Arc<CachedRepository<RepositoryBackend>>,

    /// Journey planner configuration
    pub config: Arc<PlannerConfig>,

    /// Distance used for planning and schedule offsets
    pub distance: Haversine,
}

impl AppState {
    /// Create a new app state.
    pub fn new(repository: CachedRepository<RepositoryBackend>, config: PlannerConfig) -> Self {
        Self {
            repository: Arc::new(repository),
            config: Arc::new(config),
            distance: Haversine,
        }
    }
}
