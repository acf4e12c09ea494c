//! Error types for the layout engine

use thiserror::Error;

use super::solver::SolverError;

/// Errors that can occur while building or editing a chart
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A chart needs at least one group, bar or candle
    #[error("chart '{chart}' has no elements")]
    EmptyChart { chart: String },

    /// A group needs at least one rectangle
    #[error("group {group} has no rectangles")]
    EmptyGroup { group: usize },

    /// Parallel input series of different lengths
    #[error("{what}: expected {expected} entries, found {found}")]
    MismatchedSeries {
        what: String,
        expected: usize,
        found: usize,
    },

    /// Index addressing an element that does not exist
    #[error("{what} index {index} out of bounds (len {len})")]
    IndexOutOfBounds {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Histogram bin whose upper bound lies below its lower bound
    #[error("invalid interval [{low}, {high})")]
    InvalidInterval { low: f64, high: f64 },

    /// Named element that does not exist
    #[error("unknown {what} '{name}'")]
    UnknownElement {
        what: &'static str,
        name: String,
        suggestions: Vec<String>,
    },

    /// Edit that has no meaning for this chart kind
    #[error("edit '{edit}' is not supported by {chart} charts")]
    UnsupportedEdit {
        edit: &'static str,
        chart: &'static str,
    },

    /// Constraint solver error
    #[error("constraint solver error: {0}")]
    Solver(#[from] SolverError),
}

impl LayoutError {
    /// Create an empty chart error
    pub fn empty_chart(chart: impl Into<String>) -> Self {
        Self::EmptyChart {
            chart: chart.into(),
        }
    }

    /// Create a mismatched series error
    pub fn mismatched(what: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::MismatchedSeries {
            what: what.into(),
            expected,
            found,
        }
    }

    /// Create an out of bounds error
    pub fn out_of_bounds(what: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { what, index, len }
    }

    /// Create an unknown element error
    pub fn unknown(what: &'static str, name: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self::UnknownElement {
            what,
            name: name.into(),
            suggestions,
        }
    }

    /// Get suggestions if available
    pub fn suggestions(&self) -> Option<&[String]> {
        match self {
            Self::UnknownElement { suggestions, .. } => Some(suggestions),
            _ => None,
        }
    }
}

/// Check `index < len`, naming the addressed collection on failure
pub(crate) fn check_index(what: &'static str, index: usize, len: usize) -> Result<(), LayoutError> {
    if index < len {
        Ok(())
    } else {
        Err(LayoutError::out_of_bounds(what, index, len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_display() {
        let err = LayoutError::out_of_bounds("candle", 7, 3);
        assert_eq!(err.to_string(), "candle index 7 out of bounds (len 3)");
    }

    #[test]
    fn test_mismatched_series_display() {
        let err = LayoutError::mismatched("names of group 0", 3, 2);
        assert!(err.to_string().contains("expected 3 entries, found 2"));
    }

    #[test]
    fn test_solver_error_converts() {
        let err: LayoutError = SolverError::NotEditable {
            variable: "x".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            LayoutError::Solver(SolverError::NotEditable { .. })
        ));
        assert!(err.to_string().contains("not editable"));
    }

    #[test]
    fn test_check_index() {
        assert!(check_index("bar", 2, 3).is_ok());
        assert!(matches!(
            check_index("bar", 3, 3),
            Err(LayoutError::IndexOutOfBounds { index: 3, len: 3, .. })
        ));
    }
}
