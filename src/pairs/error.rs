//! Pairs analyzer error types.

use std::fmt;

/// Errors raised by [`super::PairsAnalyzer::analyze`] (spec §4.5, §7).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnalyzerError {
    /// The two price series were not the same length, or had fewer than 10
    /// observations.
    InsufficientData { x_len: usize, y_len: usize },
    /// A regression's design matrix was singular (zero or near-zero
    /// denominator); no solution is returned rather than dividing by zero.
    SingularRegression { context: &'static str },
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerError::InsufficientData { x_len, y_len } => write!(
                f,
                "insufficient data: x has {x_len} points, y has {y_len}, both must be >= 10 and equal"
            ),
            AnalyzerError::SingularRegression { context } => {
                write!(f, "singular regression in {context}: denominator is zero")
            }
        }
    }
}

impl std::error::Error for AnalyzerError {}
