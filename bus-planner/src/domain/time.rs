//! Time-of-day handling for line timetables.
//!
//! Timetable fields arrive as "HH:MM" strings, and weekend service is
//! described as ranges such as "07:00 to 13:30". This module parses both
//! into `chrono::NaiveTime` values.

use chrono::{NaiveTime, Timelike};
use std::fmt;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a time of day from "HH:MM" (or "H:MM") format.
///
/// # Examples
///
/// ```
/// use bus_planner::domain::parse_hhmm;
///
/// assert_eq!(parse_hhmm("06:00").unwrap().to_string(), "06:00:00");
/// assert_eq!(parse_hhmm("6:05").unwrap().to_string(), "06:05:00");
/// assert!(parse_hhmm("1430").is_err());
/// assert!(parse_hhmm("25:00").is_err());
/// assert!(parse_hhmm("12:60").is_err());
/// ```
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, TimeError> {
    let s = s.trim();
    let (hours, minutes) = s
        .split_once(':')
        .ok_or_else(|| TimeError::new("expected HH:MM format"))?;

    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return Err(TimeError::new("expected HH:MM format"));
    }

    let hour = parse_digits(hours).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }

    let minute = parse_digits(minutes).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeError::new("invalid time"))
}

/// Format a time of day as "HH:MM".
pub fn format_hhmm(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Parse ASCII digits into a u32.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// A same-day range of service, inclusive at both ends.
///
/// Windows that would cross midnight are not representable; `end` is always
/// strictly after `start`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceWindow {
    start: NaiveTime,
    end: NaiveTime,
}

/// Separators accepted between the two ends of a window.
const WINDOW_SEPARATORS: [&str; 3] = [" to ", " a ", "-"];

impl ServiceWindow {
    /// Build a window from two times.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, TimeError> {
        if end <= start {
            return Err(TimeError::new("window must end after it starts"));
        }
        Ok(Self { start, end })
    }

    /// Parse a window from text such as "07:00 to 13:30".
    ///
    /// # Examples
    ///
    /// ```
    /// use bus_planner::domain::ServiceWindow;
    ///
    /// let w = ServiceWindow::parse("07:00 to 13:30").unwrap();
    /// assert_eq!(w.to_string(), "07:00 to 13:30");
    ///
    /// assert!(ServiceWindow::parse("07:00 a 13:30").is_ok());
    /// assert!(ServiceWindow::parse("07:00-13:30").is_ok());
    /// assert!(ServiceWindow::parse("13:30 to 07:00").is_err());
    /// assert!(ServiceWindow::parse("morning").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let lowered = s.trim().to_lowercase();
        let (start, end) = WINDOW_SEPARATORS
            .iter()
            .find_map(|sep| lowered.split_once(sep))
            .ok_or_else(|| TimeError::new("expected 'HH:MM to HH:MM'"))?;
        Self::new(parse_hhmm(start)?, parse_hhmm(end)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Returns true if `time` falls within the window (inclusive).
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }
}

impl fmt::Debug for ServiceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceWindow({self})")
    }
}

impl fmt::Display for ServiceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", format_hhmm(self.start), format_hhmm(self.end))
    }
}
