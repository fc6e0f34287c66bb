//! Stop records.

use std::fmt;

use super::{Coord, DomainError, LineCode};

/// Identifier of a stop within the repository.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopCode(String);

impl StopCode {
    /// Parse a stop code, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidCode("stop code is empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopCode({})", self.0)
    }
}

impl fmt::Display for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Direction a stop is served in, for lines that run both ways on
/// separate stop sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Outbound,
    Return,
}

impl Direction {
    /// Interpret an already-normalised direction tag.
    ///
    /// Unknown tags yield `None`, which the planner treats as "untagged".
    pub fn from_normalized(tag: &str) -> Option<Self> {
        match tag {
            "ida" | "outbound" | "out" => Some(Direction::Outbound),
            "vuelta" | "regreso" | "retorno" | "return" | "back" => Some(Direction::Return),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outbound => "outbound",
            Direction::Return => "return",
        }
    }
}

/// Position of a stop within its line: the direction sequence it belongs to
/// and its order in that sequence.
///
/// Orders restart in each direction, so two stops of one line are only
/// comparable by order when their directions match. Untagged stops form
/// their own sequence. Keys sort untagged first, then outbound, then return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopKey {
    pub direction: Option<Direction>,
    pub order: i64,
}

impl StopKey {
    pub fn new(direction: Option<Direction>, order: i64) -> Self {
        Self { direction, order }
    }
}

/// Coverage class of a stop within its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coverage {
    Normal,
    Internal,
    External,
}

impl Coverage {
    /// Interpret an already-normalised coverage tag.
    pub fn from_normalized(tag: &str) -> Option<Self> {
        match tag {
            "normal" => Some(Coverage::Normal),
            "interna" | "interno" | "internal" => Some(Coverage::Internal),
            "externa" | "externo" | "external" => Some(Coverage::External),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Coverage::Normal => "normal",
            Coverage::Internal => "internal",
            Coverage::External => "external",
        }
    }
}

/// A stop (or path-only waypoint) on a line.
///
/// Stops are read fresh from the repository for each planning call and are
/// never mutated by the planner. `order` is only meaningful within the
/// owning line and direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// Stop identifier
    pub code: StopCode,
    /// Owning line
    pub line: LineCode,
    /// Display name, if the record carries one
    pub name: Option<String>,
    /// Location; `None` when the record's coordinates are missing or invalid
    pub coord: Option<Coord>,
    /// Sequence position along the line
    pub order: i64,
    /// Direction tag, if the line runs separate outbound/return sequences
    pub direction: Option<Direction>,
    /// Coverage tag
    pub coverage: Option<Coverage>,
    /// Last stop of the route
    pub end_of_route: bool,
    /// Terminal (interchange-grade) stop
    pub terminal: bool,
    /// Physical stop; `false` for waypoints that only shape the route
    pub visible: bool,
    /// Normalised owning city
    pub city: Option<String>,
    /// Normalised owning parish
    pub parish: Option<String>,
}

impl Stop {
    /// Create a visible, untagged stop. Remaining fields can be set directly.
    pub fn new(code: StopCode, line: LineCode, coord: Option<Coord>, order: i64) -> Self {
        Self {
            code,
            line,
            name: None,
            coord,
            order,
            direction: None,
            coverage: None,
            end_of_route: false,
            terminal: false,
            visible: true,
            city: None,
            parish: None,
        }
    }

    /// Sequence position of this stop.
    pub fn key(&self) -> StopKey {
        StopKey::new(self.direction, self.order)
    }

    /// Returns true if both stops carry a direction tag and the tags differ.
    pub fn direction_conflicts(&self, other: &Stop) -> bool {
        matches!((self.direction, other.direction), (Some(a), Some(b)) if a != b)
    }

    /// Name for display, falling back to the code.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.code.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(code: &str, direction: Option<Direction>) -> Stop {
        let mut s = Stop::new(
            StopCode::parse(code).unwrap(),
            LineCode::parse("7").unwrap(),
            None,
            1,
        );
        s.direction = direction;
        s
    }

    #[test]
    fn stop_code_rejects_blank() {
        assert!(StopCode::parse("  ").is_err());
        assert_eq!(StopCode::parse(" P12 ").unwrap().as_str(), "P12");
    }

    #[test]
    fn direction_tags() {
        assert_eq!(Direction::from_normalized("ida"), Some(Direction::Outbound));
        assert_eq!(Direction::from_normalized("vuelta"), Some(Direction::Return));
        assert_eq!(Direction::from_normalized("return"), Some(Direction::Return));
        assert_eq!(Direction::from_normalized("sideways"), None);
    }

    #[test]
    fn coverage_tags() {
        assert_eq!(Coverage::from_normalized("normal"), Some(Coverage::Normal));
        assert_eq!(Coverage::from_normalized("interna"), Some(Coverage::Internal));
        assert_eq!(Coverage::from_normalized("external"), Some(Coverage::External));
        assert_eq!(Coverage::from_normalized(""), None);
    }

    #[test]
    fn direction_conflict_needs_both_tags() {
        let out = stop("A", Some(Direction::Outbound));
        let ret = stop("B", Some(Direction::Return));
        let none = stop("C", None);

        assert!(out.direction_conflicts(&ret));
        assert!(!out.direction_conflicts(&out.clone()));
        assert!(!out.direction_conflicts(&none));
        assert!(!none.direction_conflicts(&ret));
    }

    #[test]
    fn keys_group_by_direction_before_order() {
        let mut out2 = stop("O2", Some(Direction::Outbound));
        out2.order = 2;
        let mut ret1 = stop("R1", Some(Direction::Return));
        ret1.order = 1;
        let mut plain9 = stop("P9", None);
        plain9.order = 9;

        let mut keys = vec![ret1.key(), out2.key(), plain9.key()];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                StopKey::new(None, 9),
                StopKey::new(Some(Direction::Outbound), 2),
                StopKey::new(Some(Direction::Return), 1),
            ]
        );
    }

    #[test]
    fn display_name_falls_back_to_code() {
        let mut s = stop("P9", None);
        assert_eq!(s.display_name(), "P9");
        s.name = Some("Parque Calderón".into());
        assert_eq!(s.display_name(), "Parque Calderón");
    }
}
