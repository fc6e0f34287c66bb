//! Schedule engine.
//!
//! Turns a line's static timetable fields into "next bus in N minutes" at a
//! given stop: resolve the service window for the day, compute the
//! headway, shift by the stop's travel offset and count down to the next
//! departure. Every query is stateless; the selected line travels in an
//! explicit [`PlanningSession`].

mod engine;
mod headway;
mod session;
mod window;

pub use engine::{InactiveReason, ScheduleReport, ScheduleStatus, annotate_plan, evaluate};
pub use headway::{headway_minutes, line_speed_kmh, round_trip_m};
pub use session::PlanningSession;
pub use window::{DayType, active_window, service_windows};
