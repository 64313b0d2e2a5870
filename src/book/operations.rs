//! Public contract: `add_order`, `cancel_order`, and the accessors already
//! defined on [`OrderBook`] itself (spec §4.2).

use super::book::{OrderBook, OrderLocation};
use super::error::OrderBookError;
use crate::order::{Order, OrderId, OrderKind};
use crate::trade::Trade;
use tracing::debug;

impl OrderBook {
    /// Validates `order` itself — every field is `pub`, so a caller can
    /// hand in a struct literal that bypassed [`Order::new`]'s checks — then
    /// inserts/matches it and returns the trades it produced.
    ///
    /// # Errors
    /// Returns [`OrderBookError::InvalidOrder`] for quantity <= 0, or a
    /// `Limit`/`StopLimit` missing `price`, or a `StopMarket`/`StopLimit`
    /// missing `stop_price`, without mutating the book (spec §4.2, §7).
    pub fn add_order(&self, order: Order) -> Result<Vec<Trade>, OrderBookError> {
        validate(&order)?;

        let _guard = self.matching_lock.lock().expect("matching lock poisoned");
        let order_id = order.order_id.clone();
        let trades = self.match_order(order);
        debug!(symbol = %self.symbol, order_id = %order_id, trades = trades.len(), "order processed");
        Ok(trades)
    }

    /// Cancels a resting or parked-stop order by id.
    ///
    /// # Errors
    /// Returns [`OrderBookError::OrderNotFound`] if `order_id` is absent.
    /// Returns [`OrderBookError::InvariantViolation`] if the index and the
    /// collection it points at disagree — the book cannot be trusted to
    /// continue matching after that (spec §4.2 failure semantics).
    pub fn cancel_order(&self, order_id: &OrderId) -> Result<(), OrderBookError> {
        let _guard = self.matching_lock.lock().expect("matching lock poisoned");

        let location = self
            .index
            .remove(order_id)
            .map(|(_, location)| location)
            .ok_or_else(|| OrderBookError::OrderNotFound {
                order_id: order_id.clone(),
            })?;

        let (map, price) = match location {
            OrderLocation::Active { price, side } => (self.side_map(side), price),
            OrderLocation::Stop { stop_price, side } => (self.stop_map(side), stop_price),
        };

        let Some(level) = map.get(&price).map(|entry| entry.value().clone()) else {
            return Err(OrderBookError::InvariantViolation {
                message: format!(
                    "index pointed order {order_id} at price {price} but no level exists"
                ),
            });
        };

        let mut removed = level.remove(order_id).ok_or_else(|| OrderBookError::InvariantViolation {
            message: format!(
                "index pointed order {order_id} at price {price} but level did not contain it"
            ),
        })?;
        removed.mark_cancelled();

        if level.is_empty() {
            map.remove(&price);
        }
        // Cancelled: destroyed per spec §4.2, returned to the pool.
        self.order_pool.release(removed);
        Ok(())
    }
}

/// Step 0 of spec §4.2: reject before ever taking the matching lock, so a
/// malformed order never mutates the book.
fn validate(order: &Order) -> Result<(), OrderBookError> {
    if order.quantity == 0 {
        return Err(OrderBookError::InvalidOrder {
            reason: format!("quantity must be greater than zero, got {}", order.quantity),
        });
    }
    if matches!(order.kind, OrderKind::Limit | OrderKind::StopLimit) && order.price.is_none() {
        return Err(OrderBookError::InvalidOrder {
            reason: format!("{:?} order requires a price", order.kind),
        });
    }
    if order.kind.is_stop() && order.stop_price.is_none() {
        return Err(OrderBookError::InvalidOrder {
            reason: format!("{:?} order requires a stop_price", order.kind),
        });
    }
    Ok(())
}
