//! Unit tests for the planning entry point.

use std::collections::HashMap;
use std::sync::Mutex;

use super::search::*;
use super::config::{PlannerConfig, SpecialArea};
use crate::domain::{
    AreaContext, Category, Coord, Direction, Haversine, Line, LineCode, Plan, Stop, StopCode,
    Topology, TravelDirection,
};
use crate::repository::{RepositoryError, StopRepository};

const M_PER_DEG: f64 = 111_194.926_644_558_73;

fn at(east_m: f64, north_m: f64) -> Coord {
    Coord::new(0.001 + north_m / M_PER_DEG, 0.001 + east_m / M_PER_DEG).unwrap()
}

fn make_line(code: &str, category: Category) -> Line {
    Line::new(LineCode::parse(code).unwrap(), category, code)
}

fn make_stops(line: &Line, points: &[(f64, f64)]) -> Vec<Stop> {
    points
        .iter()
        .enumerate()
        .map(|(i, (e, n))| {
            Stop::new(
                StopCode::parse(&format!("{}-{i}", line.code)).unwrap(),
                line.code.clone(),
                Some(at(*e, *n)),
                i as i64 + 1,
            )
        })
        .collect()
}

/// Mock repository for testing.
struct MockRepository {
    lines: Vec<Line>,
    stops: HashMap<LineCode, Vec<Stop>>,
    failing_line: Option<LineCode>,
    call_count: Mutex<usize>,
}

impl MockRepository {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            stops: HashMap::new(),
            failing_line: None,
            call_count: Mutex::new(0),
        }
    }

    fn add_line(&mut self, line: Line, points: &[(f64, f64)]) {
        self.stops.insert(line.code.clone(), make_stops(&line, points));
        self.lines.push(line);
    }

    fn fail_stops_for(&mut self, code: &str) {
        self.failing_line = Some(LineCode::parse(code).unwrap());
    }

    fn api_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl StopRepository for MockRepository {
    async fn fetch_lines(
        &self,
        category: Category,
        area: &AreaContext,
    ) -> Result<Vec<Line>, RepositoryError> {
        *self.call_count.lock().unwrap() += 1;
        Ok(self
            .lines
            .iter()
            .filter(|l| l.category == category && l.serves(area))
            .cloned()
            .collect())
    }

    async fn fetch_stops(&self, line: &LineCode) -> Result<Vec<Stop>, RepositoryError> {
        *self.call_count.lock().unwrap() += 1;
        if self.failing_line.as_ref() == Some(line) {
            return Err(RepositoryError::Api {
                status: 503,
                message: "unavailable".into(),
            });
        }
        Ok(self.stops.get(line).cloned().unwrap_or_default())
    }

    async fn fetch_line(&self, line: &LineCode) -> Result<Option<Line>, RepositoryError> {
        Ok(self.lines.iter().find(|l| &l.code == line).cloned())
    }
}

fn five_stop_repo() -> MockRepository {
    let mut repo = MockRepository::new();
    repo.add_line(
        make_line("L", Category::Urban),
        &[(0.0, 0.0), (500.0, 0.0), (1000.0, 0.0), (1500.0, 0.0), (2000.0, 0.0)],
    );
    repo
}

#[tokio::test]
async fn direct_plan_found_at_first_level() {
    let repo = five_stop_repo();
    let config = PlannerConfig::default();
    let planner = Planner::new(&repo, &Haversine, &config);

    let request = PlanRequest::new(at(500.0, 50.0), at(1500.0, 50.0));
    let outcome = planner.plan(&request).await.unwrap();

    assert_eq!(outcome.radius_level, Some(0));
    assert_eq!(outcome.lines_considered, 1);
    let Some(Plan::Direct(plan)) = outcome.plan else {
        panic!("expected a direct plan");
    };
    assert_eq!(plan.leg.board.order, 2);
    assert_eq!(plan.leg.alight.order, 4);
    assert!((plan.metrics.bus_distance_m - 1000.0).abs() < 1.0);
    assert_eq!(plan.metrics.stop_count, 2);
}

#[tokio::test]
async fn empty_network_is_no_plan() {
    let repo = MockRepository::new();
    let config = PlannerConfig::default();
    let planner = Planner::new(&repo, &Haversine, &config);

    let outcome = planner
        .plan(&PlanRequest::new(at(0.0, 0.0), at(1000.0, 0.0)))
        .await
        .unwrap();
    assert!(outcome.plan.is_none());
    assert_eq!(outcome.lines_considered, 0);
}

#[tokio::test]
async fn unreachable_destination_is_no_plan() {
    let repo = five_stop_repo();
    let config = PlannerConfig::default();
    let planner = Planner::new(&repo, &Haversine, &config);

    let outcome = planner
        .plan(&PlanRequest::new(at(500.0, 50.0), at(1500.0, 9000.0)))
        .await
        .unwrap();
    assert!(outcome.plan.is_none());
    assert_eq!(outcome.radius_level, None);
    assert_eq!(outcome.lines_considered, 1);
}

#[tokio::test]
async fn repository_failure_is_an_error() {
    let mut repo = five_stop_repo();
    repo.fail_stops_for("L");
    let config = PlannerConfig::default();
    let planner = Planner::new(&repo, &Haversine, &config);

    let err = planner
        .plan(&PlanRequest::new(at(500.0, 50.0), at(1500.0, 50.0)))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::Repository(RepositoryError::Api { status: 503, .. })));
}

#[tokio::test]
async fn non_operating_lines_are_ignored() {
    let mut repo = MockRepository::new();
    let mut line = make_line("OFF", Category::Urban);
    line.operating = false;
    repo.add_line(line, &[(0.0, 0.0), (1000.0, 0.0)]);
    let config = PlannerConfig::default();
    let planner = Planner::new(&repo, &Haversine, &config);

    let outcome = planner
        .plan(&PlanRequest::new(at(0.0, 10.0), at(1000.0, 10.0)))
        .await
        .unwrap();
    assert!(outcome.plan.is_none());
    assert_eq!(outcome.lines_considered, 0);
}

#[tokio::test]
async fn missing_radius_levels_are_rejected() {
    let repo = five_stop_repo();
    let config = PlannerConfig {
        radius_levels: Vec::new(),
        ..PlannerConfig::default()
    };
    let planner = Planner::new(&repo, &Haversine, &config);

    let err = planner
        .plan(&PlanRequest::new(at(0.0, 0.0), at(1000.0, 0.0)))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::InvalidRequest(_)));
    assert_eq!(repo.api_call_count(), 0);
}

#[tokio::test]
async fn stops_fetched_once_per_line() {
    let mut repo = five_stop_repo();
    for i in 0..5 {
        repo.add_line(
            make_line(&format!("X{i}"), Category::Rural),
            &[(0.0, 5000.0), (1000.0, 5000.0)],
        );
    }
    let config = PlannerConfig {
        fetch_batch_size: 2,
        ..PlannerConfig::default()
    };
    let planner = Planner::new(&repo, &Haversine, &config);

    let network = planner
        .load_network(&PlanRequest::new(at(0.0, 0.0), at(1.0, 0.0)))
        .await
        .unwrap();
    assert_eq!(network.urban.len(), 1);
    assert_eq!(network.rural.len(), 5);
    // Two line listings plus six stop fetches
    assert_eq!(repo.api_call_count(), 8);
}

#[tokio::test]
async fn lines_from_both_areas_are_merged() {
    let mut repo = MockRepository::new();
    let mut a = make_line("A", Category::Urban);
    a.cities = vec!["cuenca".into()];
    let mut b = make_line("B", Category::Urban);
    b.cities = vec!["azogues".into()];
    repo.add_line(a, &[(0.0, 0.0), (1000.0, 0.0)]);
    repo.add_line(b, &[(0.0, 0.0), (1000.0, 0.0)]);
    let config = PlannerConfig::default();
    let planner = Planner::new(&repo, &Haversine, &config);

    let request = PlanRequest::new(at(0.0, 0.0), at(1000.0, 0.0)).with_areas(
        AreaContext::new(Some("Cuenca"), None),
        AreaContext::new(Some("Azogues"), None),
    );
    let network = planner.load_network(&request).await.unwrap();
    let codes: Vec<_> = network.urban.iter().map(|r| r.code().as_str()).collect();
    assert_eq!(codes, vec!["A", "B"]);
}

#[tokio::test]
async fn circular_line_wraps_through_planner() {
    let mut repo = MockRepository::new();
    let mut line = make_line("C", Category::Urban);
    line.topology = Topology::OneWayCircular;
    repo.add_line(
        line,
        &[(0.0, 1000.0), (1000.0, 1000.0), (1000.0, 0.0), (0.0, 0.0)],
    );
    let config = PlannerConfig::default();
    let planner = Planner::new(&repo, &Haversine, &config);

    let outcome = planner
        .plan(&PlanRequest::new(at(0.0, -30.0), at(1000.0, 1030.0)))
        .await
        .unwrap();
    let Some(Plan::Direct(plan)) = outcome.plan else {
        panic!("expected a direct plan");
    };
    assert_eq!(plan.leg.direction, TravelDirection::Circular);
    let orders: Vec<i64> = plan.leg.traversed.iter().map(|s| s.order).collect();
    assert_eq!(orders, vec![4, 1, 2]);
}

#[tokio::test]
async fn special_area_transfer_end_to_end() {
    let mut repo = MockRepository::new();
    repo.add_line(
        make_line("U1", Category::Urban),
        &[(0.0, -100.0), (2800.0, -100.0)],
    );
    repo.add_line(
        make_line("U2", Category::Urban),
        &[(0.0, 20.0), (2900.0, 20.0)],
    );
    repo.add_line(
        make_line("R", Category::Rural),
        &[(3000.0, 0.0), (6000.0, 0.0), (9000.0, 0.0)],
    );

    let mut config = PlannerConfig::default();
    config.transfer_rules.special_areas = vec![SpecialArea {
        parish: "El Valle".into(),
        urban_lines: vec!["U1".into()],
    }];
    let planner = Planner::new(&repo, &Haversine, &config);

    let request = PlanRequest::new(at(0.0, 0.0), at(9000.0, 50.0))
        .with_areas(AreaContext::anywhere(), AreaContext::new(None, Some("El Valle")));
    let outcome = planner.plan(&request).await.unwrap();

    let Some(Plan::Transfer(plan)) = outcome.plan else {
        panic!("expected a transfer plan");
    };
    assert_eq!(plan.first.line_code().as_str(), "U1");
    assert_eq!(plan.second.line_code().as_str(), "R");
    assert_eq!(outcome.radius_level, Some(0));
}

#[tokio::test]
async fn direction_tags_flow_into_plan() {
    let mut repo = MockRepository::new();
    let line = make_line("D", Category::Urban);
    let mut stops = make_stops(&line, &[(0.0, 0.0), (1000.0, 0.0), (2000.0, 0.0)]);
    for stop in &mut stops {
        stop.direction = Some(Direction::Outbound);
    }
    repo.stops.insert(line.code.clone(), stops);
    repo.lines.push(line);

    let config = PlannerConfig::default();
    let planner = Planner::new(&repo, &Haversine, &config);
    let outcome = planner
        .plan(&PlanRequest::new(at(0.0, 20.0), at(2000.0, 20.0)))
        .await
        .unwrap();
    let Some(Plan::Direct(plan)) = outcome.plan else {
        panic!("expected a direct plan");
    };
    assert_eq!(plan.leg.direction, TravelDirection::Outbound);
}

#[tokio::test]
async fn two_direction_line_rides_one_side() {
    let mut repo = MockRepository::new();
    let line = make_line("B", Category::Urban);
    let mut outbound = make_stops(
        &line,
        &[(0.0, 0.0), (500.0, 0.0), (1000.0, 0.0), (1500.0, 0.0)],
    );
    let mut inbound = make_stops(
        &line,
        &[(1500.0, 1000.0), (1000.0, 1000.0), (500.0, 1000.0), (0.0, 1000.0)],
    );
    for stop in &mut outbound {
        stop.direction = Some(Direction::Outbound);
    }
    for stop in &mut inbound {
        stop.direction = Some(Direction::Return);
        stop.code = StopCode::parse(&format!("back-{}", stop.order)).unwrap();
    }
    outbound.extend(inbound);
    repo.stops.insert(line.code.clone(), outbound);
    repo.lines.push(line);

    let config = PlannerConfig::default();
    let planner = Planner::new(&repo, &Haversine, &config);
    let outcome = planner
        .plan(&PlanRequest::new(at(500.0, 50.0), at(1500.0, 50.0)))
        .await
        .unwrap();
    let Some(Plan::Direct(plan)) = outcome.plan else {
        panic!("expected a direct plan");
    };
    assert!((plan.metrics.bus_distance_m - 1000.0).abs() < 1.0);
    assert_eq!(plan.metrics.stop_count, 2);
    assert!(plan.leg.traversed.iter().all(|s| s.direction == Some(Direction::Outbound)));
}

#[tokio::test]
async fn planning_is_deterministic() {
    let repo = five_stop_repo();
    let config = PlannerConfig::default();
    let planner = Planner::new(&repo, &Haversine, &config);
    let request = PlanRequest::new(at(400.0, 120.0), at(1700.0, -80.0));

    let a = planner.plan(&request).await.unwrap().plan.unwrap();
    let b = planner.plan(&request).await.unwrap().plan.unwrap();
    assert_eq!(a.score().to_bits(), b.score().to_bits());
    assert_eq!(a.metrics(), b.metrics());
}
