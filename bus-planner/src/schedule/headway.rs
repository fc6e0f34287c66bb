//! Headway: minutes between consecutive buses on a line.

use crate::domain::{Coord, DistanceProvider, Line, Topology};
use crate::planner::ScheduleConfig;

use super::window::DayType;

/// Distance covered by one full run of the line.
///
/// Sums consecutive segments of `coords` (ordered visible stops). A
/// circular line also closes the loop back to its first stop.
pub fn round_trip_m<D: DistanceProvider + ?Sized>(
    coords: &[Coord],
    topology: Topology,
    distance: &D,
) -> f64 {
    let mut total: f64 = coords
        .windows(2)
        .map(|w| distance.distance(w[0], w[1]))
        .filter(|d| d.is_finite())
        .sum();
    if topology == Topology::OneWayCircular && coords.len() > 2 {
        if let (Some(first), Some(last)) = (coords.first(), coords.last()) {
            let closing = distance.distance(*last, *first);
            if closing.is_finite() {
                total += closing;
            }
        }
    }
    total
}

/// Speed used for a line (km/h).
pub fn line_speed_kmh(line: &Line, config: &ScheduleConfig) -> f64 {
    line.average_speed_kmh
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(config.default_speed_kmh)
}

/// Headway in whole minutes, never below `config.min_headway_mins`.
///
/// A frequency declared for the day type wins. Otherwise the headway is the
/// round-trip time at the line's speed, spread over its fleet.
pub fn headway_minutes(
    line: &Line,
    day: DayType,
    round_trip_m: f64,
    config: &ScheduleConfig,
) -> u32 {
    let floor = config.min_headway_mins.max(1);

    let declared = match day {
        DayType::Weekday => line.weekday_frequency_mins,
        DayType::Weekend => line.weekend_frequency_mins,
    };
    if let Some(minutes) = declared {
        return minutes.max(floor);
    }

    let speed_m_per_min = line_speed_kmh(line, config) * 1000.0 / 60.0;
    if !speed_m_per_min.is_finite() || speed_m_per_min <= 0.0 || !round_trip_m.is_finite() {
        return floor;
    }
    let fleet = line.fleet_size.unwrap_or(1).max(1) as f64;
    let minutes = (round_trip_m / speed_m_per_min / fleet).round();
    if minutes >= u32::MAX as f64 {
        return u32::MAX;
    }
    (minutes as u32).max(floor)
}
