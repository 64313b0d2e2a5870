//! Position and risk-limit store collaborators (spec §6).
//!
//! The validator treats both as external: positions are "updated by the
//! downstream trade consumer" and the validator "tolerates eventual
//! consistency"; the limit store is plain CRUD. These traits let a real
//! deployment back them with whatever persistence it likes; the in-memory
//! implementations here are for tests and for embedding this crate without
//! one.

use super::error::RiskError;
use super::types::{Position, RiskLimit, RiskLimitType};
use dashmap::DashMap;

/// Read access to a user's position and account aggregates in one symbol.
pub trait PositionStore: Send + Sync {
    fn get_position(&self, user_id: &str, symbol: &str) -> Position;
}

/// CRUD on [`RiskLimit`] records keyed by `(user_id, symbol?, type)`.
pub trait RiskLimitStore: Send + Sync {
    fn create(&self, limit: RiskLimit) -> RiskLimit;
    fn limits_for(
        &self,
        user_id: &str,
        symbol: Option<&str>,
        limit_type: Option<RiskLimitType>,
    ) -> Vec<RiskLimit>;
    fn delete(&self, limit_id: &str, user_id: &str) -> Result<(), RiskError>;
}

/// A `DashMap`-backed [`PositionStore`] returning a zeroed [`Position`] for
/// any key it has not been explicitly told about.
#[derive(Debug, Default)]
pub struct InMemoryPositionStore {
    positions: DashMap<(String, String), Position>,
}

impl InMemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or replaces) the stored position for `(user_id, symbol)`. The
    /// downstream trade consumer (out of scope here) would call this after
    /// every fill in a real deployment.
    pub fn set_position(&self, user_id: &str, symbol: &str, position: Position) {
        self.positions
            .insert((user_id.to_string(), symbol.to_string()), position);
    }
}

impl PositionStore for InMemoryPositionStore {
    fn get_position(&self, user_id: &str, symbol: &str) -> Position {
        self.positions
            .get(&(user_id.to_string(), symbol.to_string()))
            .map(|entry| *entry.value())
            .unwrap_or(Position {
                quantity: 0,
                daily_volume: 0.0,
                realized_loss_today: 0.0,
                equity: 0.0,
                total_exposure: 0.0,
                symbol_position_value: 0.0,
                portfolio_value: 0.0,
            })
    }
}

/// A `DashMap`-backed [`RiskLimitStore`].
#[derive(Debug, Default)]
pub struct InMemoryRiskLimitStore {
    limits: DashMap<String, RiskLimit>,
}

impl InMemoryRiskLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RiskLimitStore for InMemoryRiskLimitStore {
    fn create(&self, limit: RiskLimit) -> RiskLimit {
        self.limits.insert(limit.limit_id.clone(), limit.clone());
        limit
    }

    fn limits_for(
        &self,
        user_id: &str,
        symbol: Option<&str>,
        limit_type: Option<RiskLimitType>,
    ) -> Vec<RiskLimit> {
        self.limits
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|limit| limit.user_id == user_id)
            .filter(|limit| match symbol {
                None => true,
                Some(s) => limit.applies_to(s),
            })
            .filter(|limit| limit_type.is_none() || limit_type == Some(limit.limit_type))
            .collect()
    }

    fn delete(&self, limit_id: &str, user_id: &str) -> Result<(), RiskError> {
        let removed = self
            .limits
            .remove_if(limit_id, |_, limit| limit.user_id == user_id);
        if removed.is_some() {
            Ok(())
        } else {
            Err(RiskError::LimitNotFound {
                limit_id: limit_id.to_string(),
            })
        }
    }
}
