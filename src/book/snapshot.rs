//! Point-in-time depth snapshot (spec §4.2 `snapshot(depth)`).

use super::book::OrderBook;
use serde::{Deserialize, Serialize};

/// One aggregated price level within a [`BookSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotLevel {
    pub price: u64,
    pub quantity: u64,
    pub order_count: usize,
}

/// A non-blocking, top-`depth` view of a book's resting liquidity.
///
/// Readers never take the book's matching lock, so a snapshot may be taken
/// mid-mutation; per spec §4.2 it may observe state slightly older than the
/// latest completed mutation, but each individual level it reports is
/// internally consistent (its quantity/count come from one atomic load).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub symbol: String,
    pub bids: Vec<SnapshotLevel>,
    pub asks: Vec<SnapshotLevel>,
    pub last_trade_price: Option<u64>,
}

impl OrderBook {
    /// Aggregates the top `depth` price levels per side.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        BookSnapshot {
            symbol: self.symbol.clone(),
            bids: self
                .bids
                .iter()
                .rev()
                .take(depth)
                .map(|entry| SnapshotLevel {
                    price: *entry.key(),
                    quantity: entry.value().total_quantity(),
                    order_count: entry.value().order_count(),
                })
                .collect(),
            asks: self
                .asks
                .iter()
                .take(depth)
                .map(|entry| SnapshotLevel {
                    price: *entry.key(),
                    quantity: entry.value().total_quantity(),
                    order_count: entry.value().order_count(),
                })
                .collect(),
            last_trade_price: self.last_trade_price(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Order, OrderKind, Side};

    fn limit(id: &str, side: Side, price: u64, qty: u64) -> Order {
        Order::new(Some(id.to_string()), "BTC/USD", side, OrderKind::Limit, Some(price), None, qty, None, "user-1")
            .unwrap()
    }

    #[test]
    fn snapshot_is_monotone_in_depth() {
        let book = OrderBook::new("BTC/USD");
        for (id, price) in [("b1", 100), ("b2", 99), ("b3", 98)] {
            book.add_order(limit(id, Side::Buy, price, 5)).unwrap();
        }
        for (id, price) in [("a1", 101), ("a2", 102), ("a3", 103)] {
            book.add_order(limit(id, Side::Sell, price, 5)).unwrap();
        }

        let shallow = book.snapshot(1);
        let deep = book.snapshot(3);

        assert_eq!(shallow.bids.len(), 1);
        assert_eq!(deep.bids.len(), 3);
        assert_eq!(&deep.bids[..shallow.bids.len()], &shallow.bids[..]);

        assert_eq!(shallow.asks.len(), 1);
        assert_eq!(deep.asks.len(), 3);
        assert_eq!(&deep.asks[..shallow.asks.len()], &shallow.asks[..]);
    }
}
