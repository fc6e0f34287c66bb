//! Domain types for the bus journey planner.
//!
//! Lines, stops and plans as the planner sees them: validated, with loose
//! record fields already resolved into enums. Code that receives these types
//! can trust their invariants.

mod error;
mod geo;
mod line;
mod plan;
mod stop;
mod text;
mod time;

pub use error::DomainError;
pub use geo::{Coord, DistanceProvider, Haversine, haversine_m};
pub use line::{AreaContext, Category, Line, LineCode, Topology};
pub use plan::{
    BusLeg, DirectPlan, LegMetrics, Plan, PlanLeg, PlanMetrics, ScoreWeights, TransferPlan,
    TravelDirection,
};
pub use stop::{Coverage, Direction, Stop, StopCode, StopKey};
pub use text::{normalize, normalize_opt};
pub use time::{ServiceWindow, TimeError, format_hhmm, parse_hhmm};
