//! Error types for data file parsing and lookup

use thiserror::Error;

use crate::error::Location;

/// Errors that can occur while parsing or registering tables and plots
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    /// Two tables or plots with the same name
    #[error("{location}: duplicate definition '{name}' (first defined at {previous})")]
    Duplicate {
        name: String,
        location: Location,
        previous: Location,
    },

    /// Block opened but never closed
    #[error("{location}: {kind} '{name}' is never closed")]
    Unterminated {
        kind: &'static str,
        name: String,
        location: Location,
    },

    /// A `.key=value` line before any `curve=` line
    #[error("{location}: curve attribute '.{key}' in plot '{plot}' appears before any 'curve=' line")]
    CurveContext {
        plot: String,
        key: String,
        location: Location,
    },

    /// A metadata line that is not `key=value`
    #[error("{location}: malformed metadata line `{line}`")]
    InvalidMetadata { location: Location, line: String },

    /// A metadata value that cannot be interpreted
    #[error("{location}: invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        location: Location,
        key: String,
        value: String,
        reason: String,
    },

    /// A row with the wrong number of cells
    #[error("{location}: row of table '{table}' has {found} cell(s), expected {expected}")]
    RaggedRow {
        table: String,
        location: Location,
        expected: usize,
        found: usize,
    },
}

impl DataError {
    pub fn invalid_value(
        location: Location,
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            location,
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Get the source location
    pub fn location(&self) -> &Location {
        match self {
            Self::Duplicate { location, .. }
            | Self::Unterminated { location, .. }
            | Self::CurveContext { location, .. }
            | Self::InvalidMetadata { location, .. }
            | Self::InvalidValue { location, .. }
            | Self::RaggedRow { location, .. } => location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_context_display() {
        let err = DataError::CurveContext {
            plot: "p".to_string(),
            key: "x".to_string(),
            location: Location::new("data.txt", 7),
        };
        let text = err.to_string();
        assert!(text.contains("data.txt:7"));
        assert!(text.contains("'.x'"));
    }

    #[test]
    fn test_location_accessor() {
        let err = DataError::invalid_value(Location::new("d", 3), "xrange", "1", "expected lo;hi");
        assert_eq!(err.location().line, 3);
    }
}
