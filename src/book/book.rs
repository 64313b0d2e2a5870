//! Core `OrderBook` struct: price-ordered collections, stop collections,
//! and the order-id index (spec §3, §4.2).

use super::price_level::PriceLevel;
use crate::order::{Order, OrderId, Side};
use crate::pool::Pool;
use crossbeam::atomic::AtomicCell;
use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

/// Where an order currently lives, for O(1) lookup by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum OrderLocation {
    /// Resting in the active bid or ask side, at `price`.
    Active { price: u64, side: Side },
    /// Parked in a stop collection awaiting trigger, at `stop_price`.
    Stop { stop_price: u64, side: Side },
}

/// One symbol's order book.
///
/// Bids are keyed by price and iterated in descending order (best bid =
/// highest price); asks ascending (best ask = lowest price). Stop bids are
/// iterated in ascending trigger order, stop asks in descending trigger
/// order — see spec §3 and §4.2 step 6.
///
/// Mutation (`add_order`/`cancel_order`) is serialized per book via
/// `matching_lock`, matching the "each book may be protected by its own
/// mutex" option in spec §5. Reads (`best_bid`, `best_ask`,
/// `last_trade_price`, `snapshot`) never take that lock and observe either a
/// before- or after-mutation view, never a torn one.
pub struct OrderBook {
    pub(super) symbol: String,
    pub(super) bids: SkipMap<u64, Arc<PriceLevel>>,
    pub(super) asks: SkipMap<u64, Arc<PriceLevel>>,
    pub(super) stop_bids: SkipMap<u64, Arc<PriceLevel>>,
    pub(super) stop_asks: SkipMap<u64, Arc<PriceLevel>>,
    pub(super) index: DashMap<OrderId, OrderLocation>,
    pub(super) last_trade_price: AtomicCell<Option<u64>>,
    pub(super) matching_lock: Mutex<()>,
    /// Recycles [`Order`] records destroyed by matching/cancellation (spec
    /// §4.1, §4.2: "destroyed when fully filled or cancelled (returned to
    /// the pool)"), and supplies the scratch records used to read a
    /// partially-filled maker's id without cloning it (see
    /// [`super::price_level::PriceLevel::fill_front`]).
    pub(super) order_pool: Pool<Order>,
}

impl OrderBook {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_pool_capacity(symbol, 0)
    }

    /// Builds a book whose [`Pool<Order>`] is pre-populated with
    /// `pool_initial_capacity` records (spec §6 "CLI/config surface"),
    /// driven by [`crate::config::EngineConfig::pool_initial_capacity`].
    pub fn with_pool_capacity(symbol: impl Into<String>, pool_initial_capacity: usize) -> Self {
        let order_pool = Pool::new(crate::order::reset as fn(&mut Order));
        order_pool.prefill(pool_initial_capacity);
        Self {
            symbol: symbol.into(),
            bids: SkipMap::new(),
            asks: SkipMap::new(),
            stop_bids: SkipMap::new(),
            stop_asks: SkipMap::new(),
            index: DashMap::new(),
            last_trade_price: AtomicCell::new(None),
            matching_lock: Mutex::new(()),
            order_pool,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Best (highest) resting bid price, lock-free.
    pub fn best_bid(&self) -> Option<u64> {
        self.bids.back().map(|entry| *entry.key())
    }

    /// Best (lowest) resting ask price, lock-free.
    pub fn best_ask(&self) -> Option<u64> {
        self.asks.front().map(|entry| *entry.key())
    }

    /// `best_ask - best_bid`, if both sides have resting liquidity.
    pub fn spread(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.saturating_sub(bid)),
            _ => None,
        }
    }

    /// Price of the most recent trade in this book, if any have occurred.
    pub fn last_trade_price(&self) -> Option<u64> {
        self.last_trade_price.load()
    }

    pub(super) fn side_map(&self, side: Side) -> &SkipMap<u64, Arc<PriceLevel>> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    pub(super) fn opposite_side_map(&self, side: Side) -> &SkipMap<u64, Arc<PriceLevel>> {
        self.side_map(side.opposite())
    }

    pub(super) fn stop_map(&self, side: Side) -> &SkipMap<u64, Arc<PriceLevel>> {
        match side {
            Side::Buy => &self.stop_bids,
            Side::Sell => &self.stop_asks,
        }
    }

    /// Fetches or lazily creates the price level at `price` on the given
    /// side collection.
    pub(super) fn level_for(
        map: &SkipMap<u64, Arc<PriceLevel>>,
        price: u64,
    ) -> Arc<PriceLevel> {
        map.get_or_insert_with(price, || Arc::new(PriceLevel::new()))
            .value()
            .clone()
    }

    /// Total count of resting orders across both active sides, for tests
    /// and diagnostics.
    pub fn active_order_count(&self) -> usize {
        self.index
            .iter()
            .filter(|entry| matches!(entry.value(), OrderLocation::Active { .. }))
            .count()
    }
}
