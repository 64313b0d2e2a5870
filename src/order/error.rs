//! Order validation errors.

use super::OrderKind;
use std::fmt;

/// Errors raised while constructing an [`super::Order`], before it is ever
/// admitted to a book. Mirrors the `Validation` kind of spec §7.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OrderValidationError {
    /// `quantity` was zero (quantities must be strictly positive).
    InvalidQuantity { quantity: u64 },
    /// A `Limit` or `StopLimit` order did not carry a `price`.
    MissingPrice { kind: OrderKind },
    /// A `StopMarket` or `StopLimit` order did not carry a `stop_price`.
    MissingStopPrice { kind: OrderKind },
}

impl fmt::Display for OrderValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderValidationError::InvalidQuantity { quantity } => {
                write!(f, "invalid quantity: {quantity} (must be > 0)")
            }
            OrderValidationError::MissingPrice { kind } => {
                write!(f, "order of kind {kind:?} requires a price")
            }
            OrderValidationError::MissingStopPrice { kind } => {
                write!(f, "order of kind {kind:?} requires a stop_price")
            }
        }
    }
}

impl std::error::Error for OrderValidationError {}
