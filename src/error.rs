//! Error types for the doe-sqc library.
//!
//! This module provides error handling using the `thiserror` crate, with
//! specific variants for design generation, effect estimation, model fitting,
//! control-chart computation and capability analysis.

use thiserror::Error;

/// The main error type for the doe-sqc library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ============ Design Errors ============
    /// The number of factors is outside the range supported by the design.
    #[error("factor count {k} is out of range (supported: {min}..={max})")]
    InvalidFactorCount {
        /// Requested number of factors.
        k: usize,
        /// Minimum supported number of factors.
        min: usize,
        /// Maximum supported number of factors.
        max: usize,
    },

    /// The number of supplied factor names does not match the factor count.
    #[error("expected {expected} factor names, got {actual}")]
    FactorNameMismatch {
        /// Number of factors in the design.
        expected: usize,
        /// Number of names supplied.
        actual: usize,
    },

    /// A factor name was not found in the design.
    #[error("unknown factor '{0}'")]
    UnknownFactor(String),

    /// A response column was not found in the design.
    #[error("unknown response '{0}'")]
    UnknownResponse(String),

    // ============ Data Errors ============
    /// The input contains no observations.
    #[error("dataset is empty")]
    EmptyDataset,

    /// The input has fewer observations than the computation requires.
    #[error("{context} requires at least {required} observations, got {actual}")]
    InsufficientData {
        /// Minimum number of observations.
        required: usize,
        /// Number of observations supplied.
        actual: usize,
        /// Name of the computation.
        context: &'static str,
    },

    /// Subgroups of a variables chart do not share one size.
    #[error("subgroup {index} has size {actual}, expected {expected}")]
    InconsistentSubgroupSize {
        /// Zero-based index of the offending subgroup.
        index: usize,
        /// Size of the first subgroup.
        expected: usize,
        /// Size of the offending subgroup.
        actual: usize,
    },

    /// Array or slice lengths are inconsistent.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension description.
        expected: String,
        /// Actual dimension description.
        actual: String,
    },

    // ============ Specification Errors ============
    /// Specification limits are not ordered (`usl` must exceed `lsl`).
    #[error("invalid specification: usl {usl} must be greater than lsl {lsl}")]
    InvalidSpecification {
        /// Upper specification limit.
        usl: f64,
        /// Lower specification limit.
        lsl: f64,
    },

    /// Invalid parameters.
    #[error("invalid parameters: {message}")]
    InvalidParams {
        /// Description of what is invalid.
        message: String,
    },

    // ============ Numerical Errors ============
    /// A statistic that must be finite came out NaN or infinite.
    #[error("non-finite result for {statistic}")]
    NonFiniteResult {
        /// Name of the statistic.
        statistic: &'static str,
    },

    /// The model only supports a fixed number of factors.
    #[error("model supports exactly {expected} factors, got {actual}")]
    UnsupportedFactorCount {
        /// Supported number of factors.
        expected: usize,
        /// Number of factors supplied.
        actual: usize,
    },

    /// The model is singular and has no unique solution.
    #[error("degenerate model: {message}")]
    DegenerateModel {
        /// Description of the degeneracy.
        message: String,
    },
}

/// A specialized `Result` type for doe-sqc operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Create a new `InvalidParams` error.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Create a new `DegenerateModel` error.
    #[must_use]
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateModel {
            message: message.into(),
        }
    }

    /// Create a new `InsufficientData` error.
    #[must_use]
    pub fn insufficient(context: &'static str, required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            required,
            actual,
            context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidFactorCount {
            k: 11,
            min: 1,
            max: 10,
        };
        assert!(err.to_string().contains("11"));
        assert!(err.to_string().contains("1..=10"));

        let err = Error::InconsistentSubgroupSize {
            index: 3,
            expected: 5,
            actual: 4,
        };
        assert!(err.to_string().contains("subgroup 3"));

        let err = Error::InvalidSpecification {
            usl: 9.0,
            lsl: 10.0,
        };
        assert!(err.to_string().contains("usl 9"));

        let err = Error::insufficient("xbar_r", 2, 1);
        assert!(err.to_string().contains("xbar_r"));
        assert!(err.to_string().contains("at least 2"));
    }

    #[test]
    fn test_error_equality() {
        let err1 = Error::UnknownFactor("X1".into());
        let err2 = Error::UnknownFactor("X1".into());
        let err3 = Error::UnknownFactor("X2".into());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
        assert_eq!(Error::degenerate("a"), Error::degenerate("a"));
    }
}
