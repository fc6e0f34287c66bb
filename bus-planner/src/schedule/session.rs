//! The line a caller is currently displaying, with its derived timings.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{Coord, DistanceProvider, Line, LineCode, Stop, StopKey};
use crate::planner::ScheduleConfig;

use super::headway::{line_speed_kmh, round_trip_m};

/// A selected line and its ordered stops, with per-stop travel offsets.
///
/// Built once when a line is selected and passed into every schedule
/// query for it. Stops are grouped by direction tag and each group is
/// timed separately: offsets are measured from the group's first stop
/// along its ordered visible stops, at the line's speed.
#[derive(Debug, Clone)]
pub struct PlanningSession {
    line: Arc<Line>,
    stops: Vec<Stop>,
    offsets: BTreeMap<StopKey, u32>,
    round_trip_m: f64,
}

impl PlanningSession {
    /// Build a session from a line and all its stops.
    ///
    /// Waypoints and stops without coordinates are left out. Stops sharing
    /// a direction and order keep the first offset computed for them.
    pub fn new<D: DistanceProvider + ?Sized>(
        line: impl Into<Arc<Line>>,
        stops: Vec<Stop>,
        distance: &D,
        config: &ScheduleConfig,
    ) -> Self {
        let line = line.into();
        let mut stops: Vec<Stop> = stops
            .into_iter()
            .filter(|s| s.visible && s.coord.is_some())
            .collect();
        stops.sort_by_key(Stop::key);

        let metres_per_sec = line_speed_kmh(&line, config) / 3.6;
        let mut offsets = BTreeMap::new();
        let mut total_m = 0.0;

        for group in stops.chunk_by(|a, b| a.direction == b.direction) {
            let coords: Vec<Coord> = group.iter().filter_map(|s| s.coord).collect();
            let mut travelled = 0.0;
            for (i, stop) in group.iter().enumerate() {
                if i > 0 {
                    let segment = distance.distance(coords[i - 1], coords[i]);
                    if segment.is_finite() {
                        travelled += segment;
                    }
                }
                let secs = if metres_per_sec > 0.0 {
                    (travelled / metres_per_sec).round()
                } else {
                    0.0
                };
                offsets
                    .entry(stop.key())
                    .or_insert(secs.clamp(0.0, u32::MAX as f64) as u32);
            }
            total_m += round_trip_m(&coords, line.topology, distance);
        }

        Self {
            line,
            stops,
            offsets,
            round_trip_m: total_m,
        }
    }

    pub fn line(&self) -> &Arc<Line> {
        &self.line
    }

    pub fn code(&self) -> &LineCode {
        &self.line.code
    }

    /// Visible stops, grouped by direction and ordered within each group.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Travel time from the first stop of the same direction, in seconds.
    /// Unknown stops are 0.
    pub fn offset_secs(&self, stop: StopKey) -> u32 {
        self.offsets.get(&stop).copied().unwrap_or(0)
    }

    /// Whether the session knows a stop at this position.
    pub fn has_stop(&self, stop: StopKey) -> bool {
        self.offsets.contains_key(&stop)
    }

    /// Distance of one full run (metres), summed over every direction.
    pub fn round_trip_m(&self) -> f64 {
        self.round_trip_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Direction, Haversine, StopCode};

    const M_PER_DEG: f64 = 111_194.926_644_558_73;

    fn at(east_m: f64) -> Coord {
        Coord::new(0.001, 0.001 + east_m / M_PER_DEG).unwrap()
    }

    fn stop(line: &Line, order: i64, east_m: f64) -> Stop {
        Stop::new(
            StopCode::parse(&format!("s{order}")).unwrap(),
            line.code.clone(),
            Some(at(east_m)),
            order,
        )
    }

    fn untagged(order: i64) -> StopKey {
        StopKey::new(None, order)
    }

    fn line() -> Line {
        let mut line = Line::new(LineCode::parse("9").unwrap(), Category::Urban, "9");
        line.average_speed_kmh = Some(18.0);
        line
    }

    #[test]
    fn offsets_accumulate_along_route() {
        // 18 km/h is 5 m/s
        let line = line();
        let stops = vec![stop(&line, 3, 1500.0), stop(&line, 1, 0.0), stop(&line, 2, 500.0)];
        let session = PlanningSession::new(line, stops, &Haversine, &ScheduleConfig::default());

        assert_eq!(session.offset_secs(untagged(1)), 0);
        assert_eq!(session.offset_secs(untagged(2)), 100);
        assert_eq!(session.offset_secs(untagged(3)), 300);
        assert_eq!(session.offset_secs(untagged(42)), 0);
        assert!(!session.has_stop(untagged(42)));
        assert!((session.round_trip_m() - 1500.0).abs() < 1.0);
    }

    #[test]
    fn waypoints_do_not_count() {
        let line = line();
        let mut waypoint = stop(&line, 2, 5000.0);
        waypoint.visible = false;
        let stops = vec![stop(&line, 1, 0.0), waypoint, stop(&line, 3, 500.0)];
        let session = PlanningSession::new(line, stops, &Haversine, &ScheduleConfig::default());

        assert_eq!(session.stops().len(), 2);
        assert_eq!(session.offset_secs(untagged(3)), 100);
    }

    #[test]
    fn default_speed_when_line_has_none() {
        let mut line = line();
        line.average_speed_kmh = None;
        let stops = vec![stop(&line, 1, 0.0), stop(&line, 2, 1000.0)];
        let session = PlanningSession::new(line, stops, &Haversine, &ScheduleConfig::default());
        // 1 km at 20 km/h
        assert_eq!(session.offset_secs(untagged(2)), 180);
    }

    #[test]
    fn each_direction_is_timed_from_its_own_start() {
        // Outbound runs east from 0 m, return runs west from 2000 m
        let line = line();
        let tagged = |order: i64, east_m: f64, direction: Direction| {
            let mut s = stop(&line, order, east_m);
            s.code = StopCode::parse(&format!("{}-{order}", direction.as_str())).unwrap();
            s.direction = Some(direction);
            s
        };
        let stops = vec![
            tagged(1, 2000.0, Direction::Return),
            tagged(1, 0.0, Direction::Outbound),
            tagged(2, 1000.0, Direction::Return),
            tagged(2, 500.0, Direction::Outbound),
            tagged(3, 0.0, Direction::Return),
            tagged(3, 2000.0, Direction::Outbound),
        ];
        let session = PlanningSession::new(line, stops, &Haversine, &ScheduleConfig::default());

        let out = |order| StopKey::new(Some(Direction::Outbound), order);
        let ret = |order| StopKey::new(Some(Direction::Return), order);
        assert_eq!(session.offset_secs(out(1)), 0);
        assert_eq!(session.offset_secs(out(2)), 100);
        assert_eq!(session.offset_secs(out(3)), 400);
        assert_eq!(session.offset_secs(ret(1)), 0);
        assert_eq!(session.offset_secs(ret(2)), 200);
        assert_eq!(session.offset_secs(ret(3)), 400);
        assert!(!session.has_stop(untagged(1)));

        let codes: Vec<_> = session.stops().iter().map(|s| s.code.as_str()).collect();
        assert_eq!(
            codes,
            vec!["outbound-1", "outbound-2", "outbound-3", "return-1", "return-2", "return-3"]
        );
        // Both legs of the run
        assert!((session.round_trip_m() - 4000.0).abs() < 1.0);
    }
}
