//! Domain error types.
//!
//! These errors represent validation failures when building domain values
//! from raw records. They are distinct from repository/IO errors.

/// Domain-level errors for validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Coordinate is missing a component or out of range
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(&'static str),

    /// Line or stop code is empty after trimming
    #[error("invalid code: {0}")]
    InvalidCode(&'static str),

    /// Category text is not one of the known service categories
    #[error("unknown line category: {0}")]
    UnknownCategory(String),

    /// Record lacks a field needed to place it in the network
    #[error("invalid record: {0}")]
    InvalidRecord(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::InvalidCoordinate("latitude out of range");
        assert_eq!(err.to_string(), "invalid coordinate: latitude out of range");

        let err = DomainError::InvalidCode("line code is empty");
        assert_eq!(err.to_string(), "invalid code: line code is empty");

        let err = DomainError::UnknownCategory("metro".into());
        assert_eq!(err.to_string(), "unknown line category: metro");

        let err = DomainError::InvalidRecord("stop has no sequence order");
        assert_eq!(err.to_string(), "invalid record: stop has no sequence order");
    }
}
