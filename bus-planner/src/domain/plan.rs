//! Plan types.
//!
//! A [`Plan`] is either a single-line [`DirectPlan`] or a two-leg
//! [`TransferPlan`]. Every plan carries its metrics and a scalar score that
//! is computed once, from the metrics, by [`PlanMetrics::score`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Coord, Line, LineCode, Stop};

/// Weights turning plan metrics into a time-equivalent score (minutes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Walking pace used to convert metres to minutes.
    pub walk_meters_per_minute: f64,
    /// Fixed cost of one transfer, in minutes.
    pub transfer_penalty_mins: f64,
    /// Cost of each stop traversed on a bus, in minutes.
    pub per_stop_penalty_mins: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            walk_meters_per_minute: 80.0,
            transfer_penalty_mins: 8.0,
            per_stop_penalty_mins: 0.5,
        }
    }
}

/// Metrics of one bus leg and the walks at either end of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegMetrics {
    pub walk_to_board_m: f64,
    pub walk_to_alight_m: f64,
    pub bus_distance_m: f64,
    pub stop_count: usize,
}

impl LegMetrics {
    /// The longer of the two walks.
    pub fn max_walk_m(&self) -> f64 {
        self.walk_to_board_m.max(self.walk_to_alight_m)
    }

    /// Both walks together.
    pub fn total_walk_m(&self) -> f64 {
        self.walk_to_board_m + self.walk_to_alight_m
    }

    /// Walks plus in-vehicle distance plus a per-stop penalty, in metres.
    pub fn composite_m(&self, penalty_per_stop_m: f64) -> f64 {
        self.total_walk_m() + self.bus_distance_m + penalty_per_stop_m * self.stop_count as f64
    }
}

/// Aggregate metrics of a whole plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanMetrics {
    pub total_walk_m: f64,
    pub bus_distance_m: f64,
    pub stop_count: usize,
    pub transfers: usize,
}

impl PlanMetrics {
    /// Time-equivalent score in minutes. Lower is better.
    pub fn score(&self, weights: &ScoreWeights) -> f64 {
        self.total_walk_m / weights.walk_meters_per_minute
            + self.transfers as f64 * weights.transfer_penalty_mins
            + self.stop_count as f64 * weights.per_stop_penalty_mins
    }
}

impl From<LegMetrics> for PlanMetrics {
    fn from(m: LegMetrics) -> Self {
        Self {
            total_walk_m: m.total_walk_m(),
            bus_distance_m: m.bus_distance_m,
            stop_count: m.stop_count,
            transfers: 0,
        }
    }
}

/// Direction label attached to a bus leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelDirection {
    Outbound,
    Return,
    Circular,
    Forward,
    Backward,
}

impl TravelDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelDirection::Outbound => "outbound",
            TravelDirection::Return => "return",
            TravelDirection::Circular => "circular",
            TravelDirection::Forward => "forward",
            TravelDirection::Backward => "backward",
        }
    }
}

/// One ride on one line.
#[derive(Debug, Clone)]
pub struct BusLeg {
    /// The line ridden
    pub line: Arc<Line>,
    /// Boarding stop
    pub board: Stop,
    /// Alighting stop
    pub alight: Stop,
    /// Index of `board` in the line's ordered stops
    pub board_index: usize,
    /// Index of `alight` in the line's ordered stops
    pub alight_index: usize,
    /// Direction label
    pub direction: TravelDirection,
    /// Stops passed, in travel order, from `board` to `alight` inclusive
    pub traversed: Vec<Stop>,
}

/// A single-line, zero-transfer itinerary.
#[derive(Debug, Clone)]
pub struct DirectPlan {
    pub leg: BusLeg,
    pub origin: Coord,
    pub destination: Coord,
    pub metrics: LegMetrics,
    score: f64,
}

impl DirectPlan {
    pub fn new(
        leg: BusLeg,
        origin: Coord,
        destination: Coord,
        metrics: LegMetrics,
        weights: &ScoreWeights,
    ) -> Self {
        let score = PlanMetrics::from(metrics).score(weights);
        Self {
            leg,
            origin,
            destination,
            metrics,
            score,
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn line_code(&self) -> &LineCode {
        &self.leg.line.code
    }

    /// Walk, bus, walk.
    pub fn legs(&self) -> Vec<PlanLeg<'_>> {
        vec![
            PlanLeg::Walk {
                from: self.origin,
                to: self.leg.board.coord.unwrap_or(self.origin),
                distance_m: self.metrics.walk_to_board_m,
            },
            PlanLeg::Bus {
                leg: &self.leg,
                distance_m: self.metrics.bus_distance_m,
                stop_count: self.metrics.stop_count,
            },
            PlanLeg::Walk {
                from: self.leg.alight.coord.unwrap_or(self.destination),
                to: self.destination,
                distance_m: self.metrics.walk_to_alight_m,
            },
        ]
    }
}

/// A two-leg itinerary joined by one walking transfer.
#[derive(Debug, Clone)]
pub struct TransferPlan {
    /// First ride, from near the origin to near the transfer stop
    pub first: DirectPlan,
    /// Second ride, from the transfer stop to near the destination
    pub second: DirectPlan,
    /// The stop the transfer was planned around
    pub transfer_stop: Stop,
    /// Walk between the first leg's alighting stop and the second's boarding stop
    pub transfer_walk_m: f64,
    pub metrics: PlanMetrics,
    score: f64,
}

impl TransferPlan {
    /// Join two rides at `transfer_stop`.
    ///
    /// Total walking counts the walk to the first boarding stop, then
    /// `transfer_walk_m`, then the walk from the last alighting stop. The
    /// transfer walk stands in for the first leg's walk to its end point and
    /// the second leg's walk from its start point, which are both measured
    /// against the transfer stop rather than the stops actually used.
    pub fn new(
        first: DirectPlan,
        second: DirectPlan,
        transfer_stop: Stop,
        transfer_walk_m: f64,
        weights: &ScoreWeights,
    ) -> Self {
        let metrics = PlanMetrics {
            total_walk_m: first.metrics.walk_to_board_m
                + transfer_walk_m
                + second.metrics.walk_to_alight_m,
            bus_distance_m: first.metrics.bus_distance_m + second.metrics.bus_distance_m,
            stop_count: first.metrics.stop_count + second.metrics.stop_count,
            transfers: 1,
        };
        let score = metrics.score(weights);
        Self {
            first,
            second,
            transfer_stop,
            transfer_walk_m,
            metrics,
            score,
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Walk, bus, transfer walk, bus, walk.
    pub fn legs(&self) -> Vec<PlanLeg<'_>> {
        let first_alight = self.first.leg.alight.coord.unwrap_or(self.first.destination);
        let second_board = self.second.leg.board.coord.unwrap_or(self.second.origin);
        let first = self.first.legs();
        let second = self.second.legs();

        let mut legs = Vec::with_capacity(5);
        legs.extend(first.into_iter().take(2));
        legs.push(PlanLeg::Walk {
            from: first_alight,
            to: second_board,
            distance_m: self.transfer_walk_m,
        });
        legs.extend(second.into_iter().skip(1));
        legs
    }
}

/// One step of a plan, for presentation.
#[derive(Debug, Clone)]
pub enum PlanLeg<'a> {
    Walk {
        from: Coord,
        to: Coord,
        distance_m: f64,
    },
    Bus {
        leg: &'a BusLeg,
        distance_m: f64,
        stop_count: usize,
    },
}

/// A complete plan.
#[derive(Debug, Clone)]
pub enum Plan {
    Direct(DirectPlan),
    Transfer(TransferPlan),
}

impl Plan {
    pub fn score(&self) -> f64 {
        match self {
            Plan::Direct(p) => p.score(),
            Plan::Transfer(p) => p.score(),
        }
    }

    pub fn metrics(&self) -> PlanMetrics {
        match self {
            Plan::Direct(p) => p.metrics.into(),
            Plan::Transfer(p) => p.metrics,
        }
    }

    pub fn transfers(&self) -> usize {
        self.metrics().transfers
    }

    pub fn legs(&self) -> Vec<PlanLeg<'_>> {
        match self {
            Plan::Direct(p) => p.legs(),
            Plan::Transfer(p) => p.legs(),
        }
    }

    /// The bus rides of this plan, in order.
    pub fn bus_legs(&self) -> Vec<&BusLeg> {
        match self {
            Plan::Direct(p) => vec![&p.leg],
            Plan::Transfer(p) => vec![&p.first.leg, &p.second.leg],
        }
    }

    /// Rough door-to-door time: walking at the scoring pace, riding at each
    /// line's average speed (or `default_speed_kmh` when unknown).
    pub fn estimated_minutes(&self, weights: &ScoreWeights, default_speed_kmh: f64) -> f64 {
        let walk = self.metrics().total_walk_m / weights.walk_meters_per_minute;
        let ride: f64 = self
            .legs()
            .iter()
            .filter_map(|leg| match leg {
                PlanLeg::Bus {
                    leg, distance_m, ..
                } => {
                    let kmh = leg
                        .line
                        .average_speed_kmh
                        .filter(|s| *s > 0.0)
                        .unwrap_or(default_speed_kmh);
                    Some(distance_m / (kmh * 1000.0 / 60.0))
                }
                PlanLeg::Walk { .. } => None,
            })
            .sum();
        walk + ride
    }
}
