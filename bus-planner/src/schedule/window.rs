//! Service window resolution.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

use crate::domain::{Line, ServiceWindow};

/// Which timetable applies on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    /// Saturday and Sunday are weekend days.
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => DayType::Weekend,
            _ => DayType::Weekday,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
        }
    }
}

/// Windows in force for `day`.
///
/// On a weekend, a line's explicit weekend windows replace the weekday
/// window; a line without any keeps its weekday window.
pub fn service_windows(line: &Line, day: DayType) -> Vec<ServiceWindow> {
    if day == DayType::Weekend && !line.weekend_windows.is_empty() {
        return line.weekend_windows.clone();
    }
    line.weekday_window().into_iter().collect()
}

/// The first window in force for `day` that contains `time`.
pub fn active_window(line: &Line, day: DayType, time: NaiveTime) -> Option<ServiceWindow> {
    service_windows(line, day)
        .into_iter()
        .find(|w| w.contains(time))
}
