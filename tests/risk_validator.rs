//! Integration tests for the pre-trade risk validator (spec §4.4).

use matching_core::{
    InMemoryPositionStore, InMemoryRiskLimitStore, OrderIntent, RiskError, RiskLimitType,
    RiskValidator, Side,
};

fn validator() -> RiskValidator<InMemoryPositionStore, InMemoryRiskLimitStore> {
    RiskValidator::new(InMemoryPositionStore::new(), InMemoryRiskLimitStore::new())
}

#[test]
fn order_within_every_configured_limit_is_approved_without_warnings() {
    let v = validator();
    v.set_limit("u1", None, RiskLimitType::MaxOrderSize, 100.0, true);
    let intent = OrderIntent { user_id: "u1", symbol: "BTC/USD", side: Side::Buy, quantity: 10, price: Some(100) };
    let result = v.validate_order(&intent);
    assert!(result.approved);
    assert!(result.warnings.is_empty());
    assert!(result.rejection_reasons.is_empty());
}

#[test]
fn multiple_limits_can_each_contribute_a_rejection_reason() {
    let v = validator();
    v.set_limit("u1", None, RiskLimitType::MaxOrderSize, 5.0, true);
    v.set_limit("u1", None, RiskLimitType::MaxDailyVolume, 1.0, true);
    let intent = OrderIntent { user_id: "u1", symbol: "BTC/USD", side: Side::Buy, quantity: 10, price: Some(100) };
    let result = v.validate_order(&intent);
    assert!(!result.approved);
    assert_eq!(result.rejection_reasons.len(), 2);
}

#[test]
fn set_limit_and_get_limits_round_trip_by_user_and_symbol() {
    let v = validator();
    v.set_limit("u1", Some("BTC/USD".to_string()), RiskLimitType::MaxOrderSize, 5.0, true);
    v.set_limit("u1", Some("ETH/USD".to_string()), RiskLimitType::MaxOrderSize, 5.0, true);

    let scoped = v.get_limits("u1", Some("BTC/USD"), None);
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].symbol.as_deref(), Some("BTC/USD"));
}

#[test]
fn delete_limit_requires_the_owning_user() {
    let v = validator();
    let limit = v.set_limit("u1", None, RiskLimitType::MaxOrderSize, 5.0, true);
    assert!(matches!(
        v.delete_limit(&limit.limit_id, "u2"),
        Err(RiskError::LimitNotFound { .. })
    ));
    assert!(v.delete_limit(&limit.limit_id, "u1").is_ok());
    assert!(v.get_limits("u1", None, None).is_empty());
}

#[test]
fn get_positions_for_an_unknown_user_returns_a_flat_position() {
    let v = validator();
    let position = v.get_positions("nobody", "BTC/USD");
    assert_eq!(position.quantity, 0);
}
