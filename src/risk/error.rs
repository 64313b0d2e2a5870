//! Risk validator error types.

use std::fmt;

/// Errors raised by [`super::RiskValidator`] limit management (spec §4.4, §7).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RiskError {
    /// `delete_limit` referenced an id that does not exist, or belongs to a
    /// different user.
    LimitNotFound { limit_id: String },
}

impl fmt::Display for RiskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskError::LimitNotFound { limit_id } => write!(f, "risk limit not found: {limit_id}"),
        }
    }
}

impl std::error::Error for RiskError {}
