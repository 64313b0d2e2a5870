//! Order data model: identity, sides, order types, and lifecycle status.

mod error;

pub use error::OrderValidationError;

use crate::utils::monotonic_nanos;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, engine-unique order identifier.
///
/// Generated from a UUID v4 when the caller submits an order without one.
pub type OrderId = String;

/// Generates a fresh order id for callers that submit without one.
pub fn generate_order_id() -> OrderId {
    Uuid::new_v4().to_string()
}

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side a resting order must be on to cross against an order on `self`.
    #[must_use]
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Order type per spec §3. `price` is required for `Limit`/`StopLimit`;
/// `stop_price` is required for `StopMarket`/`StopLimit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    Market,
    Limit,
    StopMarket,
    StopLimit,
}

impl OrderKind {
    #[must_use]
    pub fn is_stop(self) -> bool {
        matches!(self, OrderKind::StopMarket | OrderKind::StopLimit)
    }

    /// The kind a stop order becomes once its trigger fires.
    #[must_use]
    pub fn triggered_kind(self) -> OrderKind {
        match self {
            OrderKind::StopMarket => OrderKind::Market,
            OrderKind::StopLimit => OrderKind::Limit,
            other => other,
        }
    }
}

/// Lifecycle status of an order within its owning book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}

/// A single order, resting or in flight, per spec §3.
///
/// Invariant: `filled_quantity <= quantity`; `status == Filled` iff
/// `filled_quantity == quantity`. Stop orders never appear in the active
/// bid/ask side collections until triggered, at which point they are
/// reclassified in place (see [`OrderKind::triggered_kind`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub symbol: String,
    pub side: Side,
    pub kind: OrderKind,
    pub price: Option<u64>,
    pub stop_price: Option<u64>,
    pub quantity: u64,
    pub filled_quantity: u64,
    pub status: OrderStatus,
    pub client_order_id: Option<String>,
    pub user_id: String,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Default for Order {
    /// A blank, never-submitted order. Only meaningful as the shape a
    /// [`crate::pool::Pool<Order>`] hands back from an empty free list —
    /// every real order goes through [`Order::new`]'s validation instead.
    fn default() -> Self {
        Self {
            order_id: String::new(),
            symbol: String::new(),
            side: Side::Buy,
            kind: OrderKind::Market,
            price: None,
            stop_price: None,
            quantity: 0,
            filled_quantity: 0,
            status: OrderStatus::Rejected,
            client_order_id: None,
            user_id: String::new(),
            created_at: 0,
            updated_at: 0,
        }
    }
}

/// Resets a pooled [`Order`] to [`Order::default`]'s shape before reuse,
/// clearing owned `String` buffers' length without freeing their capacity
/// (spec §4.1 pool contract).
pub(crate) fn reset(order: &mut Order) {
    order.order_id.clear();
    order.symbol.clear();
    order.side = Side::Buy;
    order.kind = OrderKind::Market;
    order.price = None;
    order.stop_price = None;
    order.quantity = 0;
    order.filled_quantity = 0;
    order.status = OrderStatus::Rejected;
    order.client_order_id = None;
    order.user_id.clear();
    order.created_at = 0;
    order.updated_at = 0;
}

impl Order {
    /// Builds a new order, validating the invariants spec §3/§4.2 requires
    /// before it can ever reach a book. Assigns an id, creation timestamp and
    /// `New` status.
    ///
    /// # Errors
    /// Returns [`OrderValidationError`] when `quantity == 0`, a `Limit`/
    /// `StopLimit` lacks `price`, or a `StopMarket`/`StopLimit` lacks
    /// `stop_price`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_id: Option<OrderId>,
        symbol: impl Into<String>,
        side: Side,
        kind: OrderKind,
        price: Option<u64>,
        stop_price: Option<u64>,
        quantity: u64,
        client_order_id: Option<String>,
        user_id: impl Into<String>,
    ) -> Result<Self, OrderValidationError> {
        if quantity == 0 {
            return Err(OrderValidationError::InvalidQuantity { quantity });
        }
        if matches!(kind, OrderKind::Limit | OrderKind::StopLimit) && price.is_none() {
            return Err(OrderValidationError::MissingPrice { kind });
        }
        if kind.is_stop() && stop_price.is_none() {
            return Err(OrderValidationError::MissingStopPrice { kind });
        }

        let now = monotonic_nanos();
        Ok(Self {
            order_id: order_id.unwrap_or_else(generate_order_id),
            symbol: symbol.into(),
            side,
            kind,
            price,
            stop_price,
            quantity,
            filled_quantity: 0,
            status: OrderStatus::New,
            client_order_id,
            user_id: user_id.into(),
            created_at: now,
            updated_at: now,
        })
    }

    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.quantity - self.filled_quantity
    }

    #[must_use]
    pub fn is_resting_eligible(&self) -> bool {
        matches!(self.kind, OrderKind::Limit) && self.remaining() > 0
    }

    /// Applies a fill, updating `filled_quantity`, `status`, and `updated_at`.
    pub fn apply_fill(&mut self, quantity: u64) {
        debug_assert!(
            self.filled_quantity + quantity <= self.quantity,
            "fill exceeds order quantity"
        );
        self.filled_quantity += quantity;
        self.status = if self.filled_quantity == self.quantity {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.updated_at = monotonic_nanos();
    }

    /// Reclassifies a triggered stop order in place (§4.2 step 2, §9 notes).
    pub fn trigger(&mut self) {
        debug_assert!(self.kind.is_stop(), "trigger() called on a non-stop order");
        self.kind = self.kind.triggered_kind();
        self.updated_at = monotonic_nanos();
    }

    pub fn mark_cancelled(&mut self) {
        self.status = OrderStatus::Cancelled;
        self.updated_at = monotonic_nanos();
    }
}
