//! Trade (execution) record, emitted once per matching event.

use crate::order::{OrderId, Side};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single match between a taker and a maker order.
///
/// Immutable after creation. `price` is always the maker's price; `quantity`
/// is `min` of both sides' remaining quantity at the moment of the match
/// (spec §3, §4.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: String,
    pub symbol: String,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub maker_order_id: OrderId,
    pub taker_side: Side,
    pub price: u64,
    pub quantity: u64,
    pub timestamp: u64,
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        symbol: impl Into<String>,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        taker_order_id: OrderId,
        maker_order_id: OrderId,
        taker_side: Side,
        price: u64,
        quantity: u64,
        timestamp: u64,
    ) -> Self {
        Self {
            trade_id: Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            buy_order_id,
            sell_order_id,
            taker_order_id,
            maker_order_id,
            taker_side,
            price,
            quantity,
            timestamp,
        }
    }
}
