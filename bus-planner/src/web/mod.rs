//! Web layer for the bus journey planner.
//!
//! Provides HTTP endpoints for listing lines, finding nearby stops,
//! planning journeys and querying next departures.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
