//! Risk Validator (spec §4.4): a stateless, pure-given-its-inputs pre-trade
//! rule checker.

mod error;
mod store;
mod types;

pub use error::RiskError;
pub use store::{InMemoryPositionStore, InMemoryRiskLimitStore, PositionStore, RiskLimitStore};
pub use types::{OrderIntent, Position, RiskLimit, RiskLimitType, ValidationResult};

/// Fraction of a limit's value at which a passing check still emits a
/// warning (spec §4.4: "warnings are emitted when a metric exceeds 80% of
/// its limit").
const WARNING_THRESHOLD: f64 = 0.8;

/// Composes a [`PositionStore`] and a [`RiskLimitStore`] into the public
/// contract of spec §4.4. `validate_order` itself never mutates either
/// store — it only reads limits and positions and returns a verdict.
pub struct RiskValidator<P: PositionStore, L: RiskLimitStore> {
    positions: P,
    limits: L,
}

impl<P: PositionStore, L: RiskLimitStore> RiskValidator<P, L> {
    pub fn new(positions: P, limits: L) -> Self {
        Self { positions, limits }
    }

    /// Evaluates every enabled limit matching `intent.user_id` and
    /// (`intent.symbol` or unscoped) against the order, per the table in
    /// spec §4.4.
    pub fn validate_order(&self, intent: &OrderIntent<'_>) -> ValidationResult {
        let position = self.positions.get_position(intent.user_id, intent.symbol);
        let limits = self
            .limits
            .limits_for(intent.user_id, Some(intent.symbol), None)
            .into_iter()
            .filter(|limit| limit.enabled);

        let mut result = ValidationResult::approve();
        let notional = intent.price.unwrap_or(0) as f64 * intent.quantity as f64;

        for limit in limits {
            let Some((metric, exceeds)) = evaluate(&limit, intent, &position, notional) else {
                continue;
            };
            if exceeds {
                result.approved = false;
                result
                    .rejection_reasons
                    .push(rejection_reason(&limit, metric));
            } else if metric > limit.value * WARNING_THRESHOLD {
                result.warnings.push(warning_reason(&limit, metric));
            }
        }

        result
    }

    pub fn set_limit(
        &self,
        user_id: impl Into<String>,
        symbol: Option<String>,
        limit_type: RiskLimitType,
        value: f64,
        enabled: bool,
    ) -> RiskLimit {
        self.limits
            .create(RiskLimit::new(user_id, symbol, limit_type, value, enabled))
    }

    pub fn get_limits(
        &self,
        user_id: &str,
        symbol: Option<&str>,
        limit_type: Option<RiskLimitType>,
    ) -> Vec<RiskLimit> {
        self.limits.limits_for(user_id, symbol, limit_type)
    }

    pub fn get_positions(&self, user_id: &str, symbol: &str) -> Position {
        self.positions.get_position(user_id, symbol)
    }

    pub fn delete_limit(&self, limit_id: &str, user_id: &str) -> Result<(), RiskError> {
        self.limits.delete(limit_id, user_id)
    }
}

/// Computes the metric value for `limit`'s type and whether it exceeds the
/// limit. Returns `None` for a limit type whose metric cannot be computed
/// from `intent` (never occurs for the six defined types, but guards
/// against a future variant).
fn evaluate(
    limit: &RiskLimit,
    intent: &OrderIntent<'_>,
    position: &Position,
    notional: f64,
) -> Option<(f64, bool)> {
    let metric = match limit.limit_type {
        RiskLimitType::MaxOrderSize => intent.quantity as f64,
        RiskLimitType::MaxPositionSize => {
            position.quantity_after_fill(intent.side, intent.quantity).unsigned_abs() as f64
        }
        RiskLimitType::MaxDailyVolume => position.daily_volume + intent.quantity as f64,
        RiskLimitType::MaxDailyLoss => position.realized_loss_today + notional,
        RiskLimitType::MaxLeverage => {
            if position.equity <= 0.0 {
                return Some((f64::INFINITY, true));
            }
            (position.total_exposure + notional) / position.equity
        }
        RiskLimitType::MaxConcentration => {
            if position.portfolio_value <= 0.0 {
                return Some((f64::INFINITY, true));
            }
            (position.symbol_position_value + notional) / position.portfolio_value
        }
    };
    Some((metric, metric > limit.value))
}

fn rejection_reason(limit: &RiskLimit, metric: f64) -> String {
    format!(
        "{:?} exceeded: {metric:.4} > {:.4}",
        limit.limit_type, limit.value
    )
}

fn warning_reason(limit: &RiskLimit, metric: f64) -> String {
    format!(
        "{:?} at {:.0}% of limit ({metric:.4} / {:.4})",
        limit.limit_type,
        (metric / limit.value) * 100.0,
        limit.value
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Side;

    fn validator() -> RiskValidator<InMemoryPositionStore, InMemoryRiskLimitStore> {
        RiskValidator::new(InMemoryPositionStore::new(), InMemoryRiskLimitStore::new())
    }

    #[test]
    fn approves_when_no_limits_configured() {
        let v = validator();
        let intent = OrderIntent {
            user_id: "u1",
            symbol: "BTC/USD",
            side: Side::Buy,
            quantity: 10,
            price: Some(100),
        };
        assert!(v.validate_order(&intent).approved);
    }

    #[test]
    fn rejects_order_exceeding_max_order_size() {
        let v = validator();
        v.set_limit("u1", None, RiskLimitType::MaxOrderSize, 5.0, true);
        let intent = OrderIntent {
            user_id: "u1",
            symbol: "BTC/USD",
            side: Side::Buy,
            quantity: 10,
            price: Some(100),
        };
        let result = v.validate_order(&intent);
        assert!(!result.approved);
        assert_eq!(result.rejection_reasons.len(), 1);
    }

    #[test]
    fn warns_above_eighty_percent_without_rejecting() {
        let v = validator();
        v.set_limit("u1", None, RiskLimitType::MaxOrderSize, 10.0, true);
        let intent = OrderIntent {
            user_id: "u1",
            symbol: "BTC/USD",
            side: Side::Buy,
            quantity: 9,
            price: Some(100),
        };
        let result = v.validate_order(&intent);
        assert!(result.approved);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn disabled_limit_is_not_evaluated() {
        let v = validator();
        v.set_limit("u1", None, RiskLimitType::MaxOrderSize, 1.0, false);
        let intent = OrderIntent {
            user_id: "u1",
            symbol: "BTC/USD",
            side: Side::Buy,
            quantity: 100,
            price: Some(100),
        };
        assert!(v.validate_order(&intent).approved);
    }

    #[test]
    fn limit_scoped_to_other_symbol_does_not_apply() {
        let v = validator();
        v.set_limit(
            "u1",
            Some("ETH/USD".to_string()),
            RiskLimitType::MaxOrderSize,
            1.0,
            true,
        );
        let intent = OrderIntent {
            user_id: "u1",
            symbol: "BTC/USD",
            side: Side::Buy,
            quantity: 100,
            price: Some(100),
        };
        assert!(v.validate_order(&intent).approved);
    }

    #[test]
    fn delete_limit_rejects_wrong_user() {
        let v = validator();
        let limit = v.set_limit("u1", None, RiskLimitType::MaxOrderSize, 5.0, true);
        assert!(matches!(
            v.delete_limit(&limit.limit_id, "someone-else"),
            Err(RiskError::LimitNotFound { .. })
        ));
        assert!(v.delete_limit(&limit.limit_id, "u1").is_ok());
    }
}
