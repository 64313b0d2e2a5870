//! Risk data model (spec §3, §4.4).

use crate::order::Side;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The six limit kinds spec §4.4's evaluation table enumerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLimitType {
    MaxOrderSize,
    MaxPositionSize,
    MaxDailyVolume,
    MaxDailyLoss,
    MaxLeverage,
    MaxConcentration,
}

/// A single configured limit: scoped to a user, optionally to one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLimit {
    pub limit_id: String,
    pub user_id: String,
    pub symbol: Option<String>,
    pub limit_type: RiskLimitType,
    pub value: f64,
    pub enabled: bool,
}

impl RiskLimit {
    pub fn new(
        user_id: impl Into<String>,
        symbol: Option<String>,
        limit_type: RiskLimitType,
        value: f64,
        enabled: bool,
    ) -> Self {
        Self {
            limit_id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            symbol,
            limit_type,
            value,
            enabled,
        }
    }

    /// Whether this limit applies to `symbol`: unscoped limits (`symbol ==
    /// None`) apply to every symbol for the user.
    pub fn applies_to(&self, symbol: &str) -> bool {
        match &self.symbol {
            None => true,
            Some(s) => s == symbol,
        }
    }
}

/// A user's running exposure in one symbol, plus the account-wide
/// aggregates the evaluation rules in spec §4.4 need. Supplied by the
/// Position store collaborator (spec §6); the validator treats every field
/// here as a read-only, possibly-stale input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Signed net quantity in `symbol`: positive long, negative short.
    pub quantity: i64,
    /// Cumulative traded quantity across all symbols so far today.
    pub daily_volume: f64,
    /// Realized P&L lost today, as a positive number.
    pub realized_loss_today: f64,
    /// Total account equity.
    pub equity: f64,
    /// Total notional exposure across all symbols before this order.
    pub total_exposure: f64,
    /// Notional value of the position in `symbol` before this order.
    pub symbol_position_value: f64,
    /// Total portfolio value (equity plus unrealized P&L) before this order.
    pub portfolio_value: f64,
}

impl Position {
    /// Net quantity after applying `side`/`quantity` to the current position.
    pub fn quantity_after_fill(&self, side: Side, quantity: u64) -> i64 {
        let delta = quantity as i64;
        match side {
            Side::Buy => self.quantity + delta,
            Side::Sell => self.quantity - delta,
        }
    }
}

/// Outcome of `validate_order` (spec §4.4).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub approved: bool,
    pub rejection_reasons: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn approve() -> Self {
        Self {
            approved: true,
            rejection_reasons: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// The parameters `validate_order` evaluates (spec §4.4 public contract).
#[derive(Debug, Clone)]
pub struct OrderIntent<'a> {
    pub user_id: &'a str,
    pub symbol: &'a str,
    pub side: Side,
    pub quantity: u64,
    /// `None` for a market order; used to estimate notional exposure.
    pub price: Option<u64>,
}
