//! Integration tests for the order book's matching contract (spec §4.2).

use matching_core::{Order, OrderBook, OrderBookError, OrderKind, Side};

fn limit(id: &str, side: Side, price: u64, qty: u64) -> Order {
    Order::new(Some(id.to_string()), "BTC/USD", side, OrderKind::Limit, Some(price), None, qty, None, "user-1")
        .unwrap()
}

fn stop_market(id: &str, side: Side, stop_price: u64, qty: u64) -> Order {
    Order::new(Some(id.to_string()), "BTC/USD", side, OrderKind::StopMarket, None, Some(stop_price), qty, None, "user-1")
        .unwrap()
}

#[test]
fn crossing_orders_trade_at_the_resting_maker_price() {
    let book = OrderBook::new("BTC/USD");
    book.add_order(limit("maker", Side::Sell, 100, 10)).unwrap();
    let trades = book.add_order(limit("taker", Side::Buy, 105, 4)).unwrap();

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].price, 100);
    assert_eq!(trades[0].quantity, 4);
    assert_eq!(book.snapshot(10).asks[0].quantity, 6);
}

#[test]
fn price_time_priority_fills_oldest_order_at_a_level_first() {
    let book = OrderBook::new("BTC/USD");
    book.add_order(limit("first", Side::Sell, 100, 5)).unwrap();
    book.add_order(limit("second", Side::Sell, 100, 5)).unwrap();
    let trades = book.add_order(limit("taker", Side::Buy, 100, 5)).unwrap();

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].maker_order_id, "first");
    assert_eq!(book.snapshot(10).asks[0].quantity, 5);
}

#[test]
fn stop_market_order_parks_until_last_trade_triggers_it() {
    let book = OrderBook::new("BTC/USD");
    book.add_order(limit("liquidity", Side::Sell, 100, 5)).unwrap();

    // No trades yet, so the buy-stop can't be triggered: it parks.
    let trades = book.add_order(stop_market("stop1", Side::Buy, 100, 5)).unwrap();
    assert!(trades.is_empty());
    assert_eq!(book.active_order_count(), 1);

    // A trade at 100 establishes last_trade_price and cascades into the
    // parked stop, which crosses against "liquidity".
    book.add_order(limit("seed_sell", Side::Sell, 100, 1)).unwrap();
    let trades = book.add_order(limit("seed_buy", Side::Buy, 100, 1)).unwrap();
    assert!(trades.iter().any(|t| t.buy_order_id == "stop1"));
}

#[test]
fn cancel_removes_a_resting_order_and_frees_its_liquidity() {
    let book = OrderBook::new("BTC/USD");
    book.add_order(limit("a", Side::Buy, 100, 5)).unwrap();
    book.cancel_order(&"a".to_string()).unwrap();
    assert_eq!(book.active_order_count(), 0);
    assert!(book.best_bid().is_none());
}

#[test]
fn cancel_of_unknown_order_is_an_error() {
    let book = OrderBook::new("BTC/USD");
    let err = book.cancel_order(&"missing".to_string()).unwrap_err();
    assert!(matches!(err, OrderBookError::OrderNotFound { .. }));
}

#[test]
fn zero_quantity_order_is_rejected_as_invalid() {
    let book = OrderBook::new("BTC/USD");
    let bad = Order { quantity: 0, ..limit("bad", Side::Buy, 100, 5) };
    let err = book.add_order(bad).unwrap_err();
    assert!(matches!(err, OrderBookError::InvalidOrder { .. }));
}

#[test]
fn market_order_against_empty_book_drops_its_residual() {
    let book = OrderBook::new("BTC/USD");
    let market = Order::new(Some("m1".to_string()), "BTC/USD", Side::Buy, OrderKind::Market, None, None, 5, None, "user-1").unwrap();
    let trades = book.add_order(market).unwrap();
    assert!(trades.is_empty());
    assert_eq!(book.active_order_count(), 0);
}
