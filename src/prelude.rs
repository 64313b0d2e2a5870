/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 2/10/25
******************************************************************************/

//! Convenience re-exports of the crate's most commonly used types.
//!
//! ```
//! use matching_core::prelude::*;
//! ```

pub use crate::book::{BookSnapshot, OrderBook, OrderBookError, SnapshotLevel};
pub use crate::config::EngineConfig;
pub use crate::engine::{EngineError, EngineMetrics, MatchingEngine, MetricsSnapshot};
pub use crate::log::{InMemoryOrderLog, JournalError, LogEntry, OrderLog};
#[cfg(feature = "journal")]
pub use crate::log::FileJournal;
pub use crate::order::{Order, OrderId, OrderKind, OrderStatus, OrderValidationError, Side};
pub use crate::pairs::{AnalyzerError, CriticalValues, PairStatistics, PairsAnalyzer};
pub use crate::pool::{Envelope, Pool};
pub use crate::risk::{
    InMemoryPositionStore, InMemoryRiskLimitStore, OrderIntent, Position, PositionStore, RiskError,
    RiskLimit, RiskLimitStore, RiskLimitType, RiskValidator, ValidationResult,
};
pub use crate::trade::Trade;
