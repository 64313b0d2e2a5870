//! Order Book (spec §4.2): a single symbol's price-time priority matching
//! engine, concurrency model, and depth snapshotting.

#[allow(clippy::module_inception)]
mod book;
mod error;
mod matching;
mod operations;
mod price_level;
mod snapshot;

pub use book::OrderBook;
pub use error::OrderBookError;
pub use snapshot::{BookSnapshot, SnapshotLevel};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Order, OrderKind, Side};

    fn limit(id: &str, side: Side, price: u64, qty: u64) -> Order {
        Order::new(
            Some(id.to_string()),
            "BTC/USD",
            side,
            OrderKind::Limit,
            Some(price),
            None,
            qty,
            None,
            "user-1",
        )
        .unwrap()
    }

    fn market(id: &str, side: Side, qty: u64) -> Order {
        Order::new(
            Some(id.to_string()),
            "BTC/USD",
            side,
            OrderKind::Market,
            None,
            None,
            qty,
            None,
            "user-1",
        )
        .unwrap()
    }

    fn stop_market(id: &str, side: Side, stop_price: u64, qty: u64) -> Order {
        Order::new(
            Some(id.to_string()),
            "BTC/USD",
            side,
            OrderKind::StopMarket,
            None,
            Some(stop_price),
            qty,
            None,
            "user-1",
        )
        .unwrap()
    }

    #[test]
    fn resting_limit_orders_are_visible_in_best_bid_ask() {
        let book = OrderBook::new("BTC/USD");
        book.add_order(limit("b1", Side::Buy, 100, 5)).unwrap();
        book.add_order(limit("a1", Side::Sell, 110, 5)).unwrap();
        assert_eq!(book.best_bid(), Some(100));
        assert_eq!(book.best_ask(), Some(110));
        assert_eq!(book.spread(), Some(10));
    }

    #[test]
    fn crossing_limit_order_produces_a_trade_at_maker_price() {
        let book = OrderBook::new("BTC/USD");
        book.add_order(limit("a1", Side::Sell, 100, 10)).unwrap();
        let trades = book.add_order(limit("b1", Side::Buy, 105, 4)).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, 100);
        assert_eq!(trades[0].quantity, 4);
        assert_eq!(book.last_trade_price(), Some(100));
        // maker has 6 remaining, still resting
        assert_eq!(book.best_ask(), Some(100));
    }

    #[test]
    fn market_order_against_empty_side_drops_residual() {
        let book = OrderBook::new("BTC/USD");
        let trades = book.add_order(market("m1", Side::Buy, 10)).unwrap();
        assert!(trades.is_empty());
        assert_eq!(book.active_order_count(), 0);
    }

    #[test]
    fn price_time_priority_within_a_level() {
        let book = OrderBook::new("BTC/USD");
        book.add_order(limit("a1", Side::Sell, 100, 5)).unwrap();
        book.add_order(limit("a2", Side::Sell, 100, 5)).unwrap();
        let trades = book.add_order(limit("b1", Side::Buy, 100, 5)).unwrap();
        assert_eq!(trades[0].maker_order_id, "a1");
    }

    #[test]
    fn cancel_removes_order_from_book() {
        let book = OrderBook::new("BTC/USD");
        book.add_order(limit("b1", Side::Buy, 100, 5)).unwrap();
        book.cancel_order(&"b1".to_string()).unwrap();
        assert_eq!(book.best_bid(), None);
        assert!(matches!(
            book.cancel_order(&"b1".to_string()),
            Err(OrderBookError::OrderNotFound { .. })
        ));
    }

    #[test]
    fn stop_market_order_parks_until_triggered() {
        let book = OrderBook::new("BTC/USD");
        // seed last_trade_price at 100
        book.add_order(limit("a1", Side::Sell, 100, 5)).unwrap();
        book.add_order(limit("b1", Side::Buy, 100, 5)).unwrap();
        assert_eq!(book.last_trade_price(), Some(100));

        // buy-stop at 105 should not trigger yet
        let trades = book
            .add_order(stop_market("s1", Side::Buy, 105, 3))
            .unwrap();
        assert!(trades.is_empty());

        // resting liquidity for the stop to consume once triggered
        book.add_order(limit("a3", Side::Sell, 107, 5)).unwrap();

        // a trade at 106 should trigger it
        book.add_order(limit("a2", Side::Sell, 106, 10)).unwrap();
        let trades = book.add_order(limit("b2", Side::Buy, 106, 10)).unwrap();
        assert!(trades.iter().any(|t| t.buy_order_id == "s1"));
    }
}
