//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{
    AreaContext, BusLeg, Coord, DomainError, Line, Plan, PlanLeg, ScoreWeights, Stop, Topology,
    format_hhmm,
};
use crate::schedule::{ScheduleReport, ScheduleStatus};

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDto {
    pub lat: f64,
    pub lon: f64,
}

impl PointDto {
    pub fn to_coord(self) -> Result<Coord, DomainError> {
        Coord::new(self.lat, self.lon)
    }
}

impl From<Coord> for PointDto {
    fn from(c: Coord) -> Self {
        Self {
            lat: c.lat(),
            lon: c.lon(),
        }
    }
}

/// Where a point lies, for line selection and transfer rules.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaDto {
    pub city: Option<String>,
    pub parish: Option<String>,
}

impl AreaDto {
    pub fn to_context(&self) -> AreaContext {
        AreaContext::new(self.city.as_deref(), self.parish.as_deref())
    }
}

/// Query for listing lines.
#[derive(Debug, Deserialize)]
pub struct LinesQuery {
    /// "urbano" / "rural"; both when absent
    pub category: Option<String>,
    pub city: Option<String>,
    pub parish: Option<String>,
}

/// Query for the stops of a line nearest to a point.
#[derive(Debug, Deserialize)]
pub struct NearestQuery {
    pub lat: f64,
    pub lon: f64,
    /// Number of stops to return (default 5, max 50)
    pub k: Option<usize>,
    /// Keep only stops of this direction ("ida" / "vuelta"); untagged stops always match
    pub direction: Option<String>,
}

/// Request to plan a journey.
#[derive(Debug, Deserialize)]
pub struct PlanJourneyRequest {
    pub origin: PointDto,
    pub destination: PointDto,
    #[serde(default)]
    pub origin_area: AreaDto,
    #[serde(default)]
    pub destination_area: AreaDto,
}

/// Query for a stop's schedule.
#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    /// Line code
    pub line: String,
    /// Stop sequence order
    pub stop: i64,
    /// Direction sequence of the stop ("ida" / "vuelta"); omitted for untagged stops
    #[serde(default)]
    pub direction: Option<String>,
}

/// A line in responses.
#[derive(Debug, Serialize)]
pub struct LineResult {
    pub code: String,
    pub category: &'static str,
    pub name: String,
    pub color: Option<String>,
    pub operating: bool,
    pub circular: bool,
    pub weekday_start: Option<String>,
    pub weekday_end: Option<String>,
    pub weekend_windows: Vec<String>,
    pub weekday_frequency_mins: Option<u32>,
    pub weekend_frequency_mins: Option<u32>,
    pub average_speed_kmh: Option<f64>,
    pub fleet_size: Option<u32>,
}

impl LineResult {
    pub fn from_line(line: &Line) -> Self {
        Self {
            code: line.code.to_string(),
            category: line.category.as_str(),
            name: line.name.clone(),
            color: line.color.clone(),
            operating: line.operating,
            circular: line.topology == Topology::OneWayCircular,
            weekday_start: line.weekday_start.map(format_hhmm),
            weekday_end: line.weekday_end.map(format_hhmm),
            weekend_windows: line.weekend_windows.iter().map(|w| w.to_string()).collect(),
            weekday_frequency_mins: line.weekday_frequency_mins,
            weekend_frequency_mins: line.weekend_frequency_mins,
            average_speed_kmh: line.average_speed_kmh,
            fleet_size: line.fleet_size,
        }
    }
}

/// Response listing lines.
#[derive(Debug, Serialize)]
pub struct LinesResponse {
    pub lines: Vec<LineResult>,
}

/// A stop in responses.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub code: String,
    pub line: String,
    pub name: String,
    pub order: i64,
    pub location: Option<PointDto>,
    pub direction: Option<&'static str>,
    pub coverage: Option<&'static str>,
    pub terminal: bool,
    pub end_of_route: bool,
}

impl StopResult {
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            code: stop.code.to_string(),
            line: stop.line.to_string(),
            name: stop.display_name().to_string(),
            order: stop.order,
            location: stop.coord.map(PointDto::from),
            direction: stop.direction.map(|d| d.as_str()),
            coverage: stop.coverage.map(|c| c.as_str()),
            terminal: stop.terminal,
            end_of_route: stop.end_of_route,
        }
    }
}

/// A stop with its distance from the query point.
#[derive(Debug, Serialize)]
pub struct NearestStopResult {
    #[serde(flatten)]
    pub stop: StopResult,
    pub distance_m: f64,
}

/// Response for nearest stops.
#[derive(Debug, Serialize)]
pub struct NearestResponse {
    pub stops: Vec<NearestStopResult>,
}

/// Stop identifiers along a ride, for redrawing its path.
#[derive(Debug, Serialize)]
pub struct StopRef {
    pub code: String,
    pub order: i64,
}

/// One step of a plan.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LegResult {
    Walk {
        from: PointDto,
        to: PointDto,
        distance_m: f64,
    },
    Bus {
        line: String,
        line_name: String,
        color: Option<String>,
        direction: &'static str,
        board: StopResult,
        alight: StopResult,
        distance_m: f64,
        stop_count: usize,
        traversed: Vec<StopRef>,
    },
}

impl LegResult {
    pub fn from_leg(leg: &PlanLeg<'_>) -> Self {
        match leg {
            PlanLeg::Walk {
                from,
                to,
                distance_m,
            } => LegResult::Walk {
                from: (*from).into(),
                to: (*to).into(),
                distance_m: *distance_m,
            },
            PlanLeg::Bus {
                leg,
                distance_m,
                stop_count,
            } => Self::from_bus(leg, *distance_m, *stop_count),
        }
    }

    fn from_bus(leg: &BusLeg, distance_m: f64, stop_count: usize) -> Self {
        LegResult::Bus {
            line: leg.line.code.to_string(),
            line_name: leg.line.name.clone(),
            color: leg.line.color.clone(),
            direction: leg.direction.as_str(),
            board: StopResult::from_stop(&leg.board),
            alight: StopResult::from_stop(&leg.alight),
            distance_m,
            stop_count,
            traversed: leg
                .traversed
                .iter()
                .map(|s| StopRef {
                    code: s.code.to_string(),
                    order: s.order,
                })
                .collect(),
        }
    }
}

/// A plan in responses.
#[derive(Debug, Serialize)]
pub struct PlanResult {
    /// "direct" or "transfer"
    pub kind: &'static str,
    pub score: f64,
    pub transfers: usize,
    pub total_walk_m: f64,
    pub bus_distance_m: f64,
    pub stop_count: usize,
    pub estimated_minutes: f64,
    pub transfer_stop: Option<StopResult>,
    pub legs: Vec<LegResult>,
}

impl PlanResult {
    pub fn from_plan(plan: &Plan, weights: &ScoreWeights, default_speed_kmh: f64) -> Self {
        let metrics = plan.metrics();
        let (kind, transfer_stop) = match plan {
            Plan::Direct(_) => ("direct", None),
            Plan::Transfer(t) => ("transfer", Some(StopResult::from_stop(&t.transfer_stop))),
        };

        Self {
            kind,
            score: plan.score(),
            transfers: metrics.transfers,
            total_walk_m: metrics.total_walk_m,
            bus_distance_m: metrics.bus_distance_m,
            stop_count: metrics.stop_count,
            estimated_minutes: plan.estimated_minutes(weights, default_speed_kmh),
            transfer_stop,
            legs: plan.legs().iter().map(LegResult::from_leg).collect(),
        }
    }
}

/// A schedule answer in responses.
#[derive(Debug, Serialize)]
pub struct ScheduleResult {
    pub line: String,
    pub stop_order: i64,
    pub direction: Option<&'static str>,
    pub day: &'static str,
    pub window: Option<String>,
    pub headway_minutes: u32,
    pub offset_secs: u32,
    /// "active", "ended_for_day" or "inactive"
    pub status: &'static str,
    pub reason: Option<&'static str>,
    pub next_departure: Option<String>,
    pub countdown_secs: Option<u32>,
}

impl ScheduleResult {
    pub fn from_report(report: &ScheduleReport) -> Self {
        let (status, reason, next_departure, countdown_secs) = match report.status {
            ScheduleStatus::Inactive(reason) => ("inactive", Some(reason.as_str()), None, None),
            ScheduleStatus::EndedForDay => ("ended_for_day", None, None, None),
            ScheduleStatus::Active {
                next_departure,
                countdown_secs,
            } => (
                "active",
                None,
                Some(format_hhmm(next_departure)),
                Some(countdown_secs),
            ),
        };

        Self {
            line: report.line.to_string(),
            stop_order: report.stop.order,
            direction: report.stop.direction.map(|d| d.as_str()),
            day: report.day.as_str(),
            window: report.window.map(|w| w.to_string()),
            headway_minutes: report.headway_minutes,
            offset_secs: report.offset_secs,
            status,
            reason,
            next_departure,
            countdown_secs,
        }
    }
}

/// Response for a journey plan.
#[derive(Debug, Serialize)]
pub struct PlanJourneyResponse {
    /// Absent when nothing is reachable
    pub plan: Option<PlanResult>,
    pub radius_level: Option<usize>,
    pub lines_considered: usize,
    /// Next departures at each boarding stop
    pub schedule: Vec<ScheduleResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
