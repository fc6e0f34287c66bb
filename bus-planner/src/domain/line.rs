//! Line records and the area context used to select them.

use std::fmt;

use chrono::NaiveTime;

use super::text::normalize_opt;
use super::{DomainError, ServiceWindow};

/// Identifier of a line, e.g. "7" or "R-12".
///
/// Codes are trimmed and uppercased on construction so lookups never need
/// to re-normalise.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineCode(String);

impl LineCode {
    /// Parse a line code.
    ///
    /// # Examples
    ///
    /// ```
    /// use bus_planner::domain::LineCode;
    ///
    /// assert_eq!(LineCode::parse(" r-12 ").unwrap().as_str(), "R-12");
    /// assert!(LineCode::parse("").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidCode("line code is empty"));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineCode({})", self.0)
    }
}

impl fmt::Display for LineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Service category of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Urban,
    Rural,
}

impl Category {
    /// Both categories, in the order the planner evaluates them.
    pub const ALL: [Category; 2] = [Category::Urban, Category::Rural];

    /// Interpret an already-normalised category string.
    pub fn from_normalized(s: &str) -> Result<Self, DomainError> {
        match s {
            "urbano" | "urbana" | "urban" => Ok(Category::Urban),
            "rural" => Ok(Category::Rural),
            other => Err(DomainError::UnknownCategory(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Urban => "urban",
            Category::Rural => "rural",
        }
    }

    /// The category a transfer switches to.
    pub fn other(&self) -> Category {
        match self {
            Category::Urban => Category::Rural,
            Category::Rural => Category::Urban,
        }
    }
}

/// How a line's stop sequence may be traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Ordered sequence usable in either direction.
    Linear,
    /// One-way loop: only increasing order, wrapping from last to first.
    OneWayCircular,
}

/// Where a caller is, for selecting the lines that serve them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AreaContext {
    /// Normalised city name
    pub city: Option<String>,
    /// Normalised parish name
    pub parish: Option<String>,
}

impl AreaContext {
    /// Build a context, normalising both names.
    pub fn new(city: Option<&str>, parish: Option<&str>) -> Self {
        Self {
            city: normalize_opt(city),
            parish: normalize_opt(parish),
        }
    }

    /// A context that matches every line.
    pub fn anywhere() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.parish.is_none()
    }
}

/// A bus line with its timetable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Line identifier
    pub code: LineCode,
    /// Urban or rural service
    pub category: Category,
    /// Human-readable name
    pub name: String,
    /// Display colour, e.g. "#e53935"
    pub color: Option<String>,
    /// Whether the line is currently running at all
    pub operating: bool,
    /// Traversal rule, resolved once when the line is loaded
    pub topology: Topology,
    /// Weekday service start
    pub weekday_start: Option<NaiveTime>,
    /// Weekday service end
    pub weekday_end: Option<NaiveTime>,
    /// Explicit weekend windows; empty means "same as weekdays"
    pub weekend_windows: Vec<ServiceWindow>,
    /// Weekday headway in minutes, if published
    pub weekday_frequency_mins: Option<u32>,
    /// Weekend headway in minutes, if published
    pub weekend_frequency_mins: Option<u32>,
    /// Average commercial speed in km/h
    pub average_speed_kmh: Option<f64>,
    /// Number of buses assigned to the line
    pub fleet_size: Option<u32>,
    /// Normalised cities served; empty means unrestricted
    pub cities: Vec<String>,
    /// Normalised parishes served; empty means unrestricted
    pub parishes: Vec<String>,
}

impl Line {
    /// Create an operating linear line with no timetable data.
    pub fn new(code: LineCode, category: Category, name: impl Into<String>) -> Self {
        Self {
            code,
            category,
            name: name.into(),
            color: None,
            operating: true,
            topology: Topology::Linear,
            weekday_start: None,
            weekday_end: None,
            weekend_windows: Vec::new(),
            weekday_frequency_mins: None,
            weekend_frequency_mins: None,
            average_speed_kmh: None,
            fleet_size: None,
            cities: Vec::new(),
            parishes: Vec::new(),
        }
    }

    /// The weekday service window, if both ends are known and well-ordered.
    pub fn weekday_window(&self) -> Option<ServiceWindow> {
        ServiceWindow::new(self.weekday_start?, self.weekday_end?).ok()
    }

    pub fn is_circular(&self) -> bool {
        self.topology == Topology::OneWayCircular
    }

    /// Returns true if the line serves the given area.
    ///
    /// A line with no declared service area serves everywhere. Otherwise the
    /// context's city must be among the line's cities, or its parish among
    /// the line's parishes.
    pub fn serves(&self, area: &AreaContext) -> bool {
        if area.is_empty() || (self.cities.is_empty() && self.parishes.is_empty()) {
            return true;
        }
        let city_match = area
            .city
            .as_ref()
            .is_some_and(|c| self.cities.iter().any(|x| x == c));
        let parish_match = area
            .parish
            .as_ref()
            .is_some_and(|p| self.parishes.iter().any(|x| x == p));
        city_match || parish_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_hhmm;

    fn line() -> Line {
        Line::new(LineCode::parse("7").unwrap(), Category::Urban, "Línea 7")
    }

    #[test]
    fn category_parsing() {
        assert_eq!(Category::from_normalized("urbano").unwrap(), Category::Urban);
        assert_eq!(Category::from_normalized("rural").unwrap(), Category::Rural);
        assert!(Category::from_normalized("metro").is_err());
        assert_eq!(Category::Urban.other(), Category::Rural);
    }

    #[test]
    fn weekday_window_requires_both_ends() {
        let mut l = line();
        assert!(l.weekday_window().is_none());

        l.weekday_start = Some(parse_hhmm("06:00").unwrap());
        assert!(l.weekday_window().is_none());

        l.weekday_end = Some(parse_hhmm("19:30").unwrap());
        assert_eq!(l.weekday_window().unwrap().to_string(), "06:00 to 19:30");

        l.weekday_end = Some(parse_hhmm("05:00").unwrap());
        assert!(l.weekday_window().is_none());
    }

    #[test]
    fn unrestricted_line_serves_everywhere() {
        let l = line();
        assert!(l.serves(&AreaContext::new(Some("Cuenca"), Some("Baños"))));
        assert!(l.serves(&AreaContext::anywhere()));
    }

    #[test]
    fn restricted_line_matches_city_or_parish() {
        let mut l = line();
        l.cities = vec!["cuenca".into()];
        l.parishes = vec!["banos".into()];

        assert!(l.serves(&AreaContext::new(Some("CUENCA"), None)));
        assert!(l.serves(&AreaContext::new(Some("Azogues"), Some("Baños"))));
        assert!(!l.serves(&AreaContext::new(Some("Azogues"), Some("Cojitambo"))));
        assert!(l.serves(&AreaContext::anywhere()));
    }
}
