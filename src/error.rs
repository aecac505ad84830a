// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types shared by the table, the evaluators and the search strategies.
//!
//! Configuration problems are reported once, when an object is built, and are
//! never silently clamped. Range errors can only come out of evaluation when
//! segment arithmetic is broken, so they surface as a distinct variant.

use thiserror::Error;

/// Errors raised while building or running a search.
#[derive(Debug, Error)]
pub enum Error {
    /// A parameter combination that can never produce a valid table, figure or search.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A lookup or index fell outside the domain that was built.
    #[error("{what} {index} is out of range (limit {limit})")]
    OutOfRange {
        what: &'static str,
        index: u64,
        limit: u64,
    },

    /// A real coordinate that cannot be encoded as a fixed-point fraction.
    #[error("coordinate {value} lies outside [0, 1)")]
    CoordinateOutsideUnitInterval { value: f64 },

    /// Point set and evaluator disagree on the number of bits per coordinate.
    #[error("point set has {found} bits per coordinate, evaluator expects {expected}")]
    PrecisionMismatch { expected: usize, found: usize },

    /// A configuration document could not be parsed.
    #[error("cannot parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration(message.into())
    }

    pub(crate) fn out_of_range(what: &'static str, index: u64, limit: u64) -> Self {
        Error::OutOfRange { what, index, limit }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::invalid("q must be positive");
        assert_eq!(err.to_string(), "invalid configuration: q must be positive");

        let err = Error::out_of_range("segment index", 5, 4);
        assert_eq!(err.to_string(), "segment index 5 is out of range (limit 4)");

        let err = Error::PrecisionMismatch {
            expected: 15,
            found: 30,
        };
        assert_eq!(
            err.to_string(),
            "point set has 30 bits per coordinate, evaluator expects 15"
        );
    }
}
