//! Price-time priority matching algorithm (spec §4.2).

use super::book::{OrderBook, OrderLocation};
use super::price_level::PriceLevel;
use crate::order::{Order, OrderKind, Side};
use crate::trade::Trade;
use crate::utils::current_time_millis;
use std::sync::Arc;
use tracing::{trace, warn};

impl OrderBook {
    /// Inserts/matches `order`, returning every trade it produced in
    /// execution order. Caller must hold `matching_lock`.
    pub(super) fn match_order(&self, mut order: Order) -> Vec<Trade> {
        let mut trades = Vec::new();

        // Step 1/2: stop gating and reclassification.
        if order.kind.is_stop() {
            if self.stop_triggered(order.side, order.stop_price.expect("validated at construction")) {
                order.trigger();
            } else {
                self.park_stop(order);
                return trades;
            }
        }

        self.cross(&mut order, &mut trades);
        self.rest_or_drop(order, &mut trades);

        // Step 6: cascade through any stops the trades above activated.
        self.trigger_cascaded_stops(&mut trades);

        trades
    }

    /// Whether a stop order on `side` with trigger `stop_price` has already
    /// fired against the book's current last trade price (step 1).
    fn stop_triggered(&self, side: Side, stop_price: u64) -> bool {
        match self.last_trade_price() {
            None => false,
            Some(last) => match side {
                Side::Buy => last >= stop_price,
                Side::Sell => last <= stop_price,
            },
        }
    }

    /// Parks an untriggered stop order in its stop collection and index.
    fn park_stop(&self, order: Order) {
        let stop_price = order.stop_price.expect("validated at construction");
        let side = order.side;
        let order_id = order.order_id.clone();
        let level = Self::level_for(self.stop_map(side), stop_price);
        level.push_back(order);
        self.index.insert(
            order_id,
            OrderLocation::Stop { stop_price, side },
        );
    }

    /// Step 3–4: the crossing loop against the opposite side.
    fn cross(&self, order: &mut Order, trades: &mut Vec<Trade>) {
        loop {
            if order.remaining() == 0 {
                break;
            }
            let opposite = self.opposite_side_map(order.side);
            let best_entry = match order.side {
                Side::Buy => opposite.front(),
                Side::Sell => opposite.back(),
            };
            let Some(entry) = best_entry else { break };
            let resting_price = *entry.key();

            if !crosses(order, resting_price) {
                break;
            }

            let level = entry.value().clone();
            let (maker_filled, maker_done, qty) =
                self.fill_front_against(&level, order.remaining());

            let (buy_order_id, sell_order_id, maker_order_id) = match order.side {
                Side::Buy => (
                    order.order_id.clone(),
                    maker_filled.order_id.clone(),
                    maker_filled.order_id.clone(),
                ),
                Side::Sell => (
                    maker_filled.order_id.clone(),
                    order.order_id.clone(),
                    maker_filled.order_id.clone(),
                ),
            };

            order.apply_fill(qty);

            let trade = Trade::new(
                self.symbol.clone(),
                buy_order_id,
                sell_order_id,
                order.order_id.clone(),
                maker_order_id,
                order.side,
                resting_price,
                qty,
                current_time_millis(),
            );
            trace!(symbol = %self.symbol, price = resting_price, qty, "trade executed");
            self.last_trade_price.store(Some(resting_price));
            trades.push(trade);

            if maker_done {
                self.index.remove(&maker_filled.order_id);
                if level.is_empty() {
                    self.side_map(order.side.opposite()).remove(&resting_price);
                }
            }
            // Either the maker was destroyed by this fill, or `maker_filled`
            // is only the scratch record `fill_front` acquired from the pool
            // to carry its id — both are done with it now.
            self.order_pool.release(maker_filled);
        }
    }

    /// Applies a fill to the order at the front of `level`, returning a copy
    /// of the (possibly now-departed) maker order, whether it was fully
    /// filled, and the quantity actually traded.
    fn fill_front_against(&self, level: &Arc<PriceLevel>, taker_remaining: u64) -> (Order, bool, u64) {
        let front_remaining = level
            .front_remaining()
            .expect("cross() only calls this when the level is non-empty");
        let qty = taker_remaining.min(front_remaining);
        let (maker, done) = level.fill_front(qty, &self.order_pool);
        (maker, done, qty)
    }

    /// Step 5: rest a partially/unfilled limit order, or drop a market
    /// residual with a warning.
    fn rest_or_drop(&self, mut order: Order, _trades: &mut [Trade]) {
        if order.remaining() == 0 {
            // Fully filled: destroyed per spec §4.2, returned to the pool.
            self.order_pool.release(order);
            return;
        }
        match order.kind {
            OrderKind::Limit => {
                let price = order.price.expect("validated at construction");
                let side = order.side;
                let order_id = order.order_id.clone();
                let level = Self::level_for(self.side_map(side), price);
                level.push_back(order);
                self.index.insert(order_id, OrderLocation::Active { price, side });
            }
            OrderKind::Market => {
                order.status = crate::order::OrderStatus::PartiallyFilled;
                warn!(
                    symbol = %self.symbol,
                    order_id = %order.order_id,
                    remaining = order.remaining(),
                    "market order residual dropped, no resting liquidity"
                );
                self.order_pool.release(order);
            }
            OrderKind::StopMarket | OrderKind::StopLimit => {
                unreachable!("stop orders are reclassified before reaching rest_or_drop")
            }
        }
    }

    /// Step 6: after any trade moves `last_trade_price`, drain and
    /// reprocess every stop whose trigger condition now holds, in the
    /// order spec §4.2 step 6 requires (ascending for buy-stops, descending
    /// for sell-stops), recursively feeding any trades they produce back
    /// into the same cascade.
    fn trigger_cascaded_stops(&self, trades: &mut Vec<Trade>) {
        while let Some(last) = self.last_trade_price() {
            let mut triggered = None;

            for entry in self.stop_bids.iter() {
                let stop_price = *entry.key();
                if last >= stop_price && !entry.value().is_empty() {
                    triggered = Some((Side::Buy, entry.value().clone(), stop_price));
                    break;
                }
                if last < stop_price {
                    break;
                }
            }
            if triggered.is_none() {
                for entry in self.stop_asks.iter().rev() {
                    let stop_price = *entry.key();
                    if last <= stop_price && !entry.value().is_empty() {
                        triggered = Some((Side::Sell, entry.value().clone(), stop_price));
                        break;
                    }
                    if last > stop_price {
                        break;
                    }
                }
            }

            let Some((side, level, stop_price)) = triggered else { break };
            let Some(mut stop_order) = level.pop_front() else { break };
            self.index.remove(&stop_order.order_id);
            if level.is_empty() {
                self.stop_map(side).remove(&stop_price);
            }

            stop_order.trigger();
            self.cross(&mut stop_order, trades);
            self.rest_or_drop(stop_order, trades);
        }
    }
}

/// Crossing condition for an order against a resting price (step 4).
fn crosses(order: &Order, resting_price: u64) -> bool {
    match order.kind {
        OrderKind::Market => true,
        OrderKind::Limit => {
            let limit_price = order.price.expect("validated at construction");
            match order.side {
                Side::Buy => resting_price <= limit_price,
                Side::Sell => resting_price >= limit_price,
            }
        }
        OrderKind::StopMarket | OrderKind::StopLimit => {
            unreachable!("stop orders are reclassified before crossing")
        }
    }
}
