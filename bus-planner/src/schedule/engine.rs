//! Next-departure estimation.
//!
//! A schedule query is a pure function of a session, a stop and an instant:
//! evaluating it twice at the same instant gives the same answer, so callers
//! can re-run it on a timer while a plan stays on screen.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use tracing::trace;

use crate::domain::{LineCode, Plan, ServiceWindow, StopKey};
use crate::planner::ScheduleConfig;

use super::headway::headway_minutes;
use super::session::PlanningSession;
use super::window::{DayType, active_window, service_windows};

const SECS_PER_DAY: u32 = 24 * 60 * 60;

/// Why a line is not running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InactiveReason {
    /// The line is flagged as not operating
    LineNotOperating,
    /// The line has no usable timetable for this day
    NoServiceWindow,
    /// Outside every service window
    OutOfService,
}

impl InactiveReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InactiveReason::LineNotOperating => "line_not_operating",
            InactiveReason::NoServiceWindow => "no_service_window",
            InactiveReason::OutOfService => "out_of_service",
        }
    }
}

/// Operating status at a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleStatus {
    Inactive(InactiveReason),
    /// The next bus would leave after the window closes
    EndedForDay,
    Active {
        next_departure: NaiveTime,
        countdown_secs: u32,
    },
}

/// A schedule answer for one stop of one line.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleReport {
    pub line: LineCode,
    pub stop: StopKey,
    pub day: DayType,
    /// The window containing the query time, before the stop's offset
    pub window: Option<ServiceWindow>,
    pub headway_minutes: u32,
    pub offset_secs: u32,
    pub status: ScheduleStatus,
}

/// Evaluate the schedule of `session`'s line at `stop` at `now`.
pub fn evaluate(
    session: &PlanningSession,
    stop: StopKey,
    now: NaiveDateTime,
    config: &ScheduleConfig,
) -> ScheduleReport {
    let line = session.line();
    let day = DayType::of(now.date());
    let headway = headway_minutes(line, day, session.round_trip_m(), config);
    let offset_secs = session.offset_secs(stop);

    let report = |window: Option<ServiceWindow>, status: ScheduleStatus| ScheduleReport {
        line: line.code.clone(),
        stop,
        day,
        window,
        headway_minutes: headway,
        offset_secs,
        status,
    };

    if !line.operating {
        return report(None, ScheduleStatus::Inactive(InactiveReason::LineNotOperating));
    }
    if service_windows(line, day).is_empty() {
        return report(None, ScheduleStatus::Inactive(InactiveReason::NoServiceWindow));
    }
    let Some(window) = active_window(line, day, now.time()) else {
        return report(None, ScheduleStatus::Inactive(InactiveReason::OutOfService));
    };

    let status = next_departure(&window, offset_secs, headway, now.time());
    trace!(line = %line.code, ?stop, ?status, "Evaluated schedule");
    report(Some(window), status)
}

/// Next departure inside `window` shifted by `offset_secs`.
fn next_departure(
    window: &ServiceWindow,
    offset_secs: u32,
    headway_minutes: u32,
    now: NaiveTime,
) -> ScheduleStatus {
    let start = u64::from(window.start().num_seconds_from_midnight()) + u64::from(offset_secs);
    let end = u64::from(window.end().num_seconds_from_midnight()) + u64::from(offset_secs);
    let now = u64::from(now.num_seconds_from_midnight());
    let headway = u64::from(headway_minutes.max(1)) * 60;

    let next = if now < start {
        start
    } else {
        let steps = (now - start) / headway;
        start + (steps + 1) * headway
    };

    if next > end {
        return ScheduleStatus::EndedForDay;
    }

    let time_of_day = (next % u64::from(SECS_PER_DAY)) as u32;
    match NaiveTime::from_num_seconds_from_midnight_opt(time_of_day, 0) {
        Some(next_departure) => ScheduleStatus::Active {
            next_departure,
            countdown_secs: (next - now) as u32,
        },
        None => ScheduleStatus::EndedForDay,
    }
}

/// Schedule reports for each bus leg's boarding stop.
///
/// Legs whose line has no session are skipped.
pub fn annotate_plan(
    plan: &Plan,
    sessions: &[PlanningSession],
    now: NaiveDateTime,
    config: &ScheduleConfig,
) -> Vec<ScheduleReport> {
    plan.bus_legs()
        .into_iter()
        .filter_map(|leg| {
            let session = sessions.iter().find(|s| s.code() == &leg.line.code)?;
            Some(evaluate(session, leg.board.key(), now, config))
        })
        .collect()
}
