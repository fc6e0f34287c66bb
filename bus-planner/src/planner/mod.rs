//! Journey planning over bus lines.
//!
//! Answers: "from here, which bus do I take, where do I get on and off,
//! and do I need to change between urban and rural lines?"
//!
//! Planning runs over a per-request snapshot of the network:
//! 1. Candidate search ranks stops near a point ([`candidates`]).
//! 2. The direct planner picks the most balanced board/alight pair on each
//!    line ([`direct`]), walking circular lines forward only ([`traversal`]).
//! 3. The composer tries one-transfer trips when no line gets close enough
//!    to the destination ([`multimodal`]).
//! 4. All of this runs under increasing walking ceilings until a plan
//!    appears ([`radius`]).

pub mod candidates;
mod config;
pub mod direct;
pub mod multimodal;
mod network;
pub mod radius;
mod rank;
mod search;
pub mod traversal;

#[cfg(test)]
mod search_tests;

pub use candidates::{Candidate, nearest_k};
pub use config::{PlannerConfig, RadiusLevel, ScheduleConfig, SpecialArea, TransferRules};
pub use direct::{DirectParams, best_direct, plan_direct};
pub use network::{Network, Route};
pub use rank::{best_plan, compare_legs, compare_plans, rank_plans};
pub use search::{PlanError, PlanOutcome, PlanRequest, Planner};
