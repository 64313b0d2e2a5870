//! # Matching Core
//!
//! The core of a multi-symbol trading-venue backend: a price-time-priority
//! order book per symbol, a matching engine that multiplexes many symbols
//! and streams out executed trades, a stateless pre-trade risk validator,
//! and a statistical-arbitrage pairs analyzer.
//!
//! ## Modules
//!
//! - [`order`] — order identity, sides, kinds, and lifecycle.
//! - [`trade`] — the execution record emitted by a match.
//! - [`pool`] — thread-safe object pooling for the matching hot path.
//! - [`book`] — a single symbol's order book: price-time priority matching,
//!   stop orders, cancellation, depth snapshots.
//! - [`engine`] — the [`engine::MatchingEngine`] multiplexing many
//!   [`book::OrderBook`]s behind one outbound trade stream, with latency
//!   metrics.
//! - [`risk`] — [`risk::RiskValidator`], a stateless pre-trade rule checker.
//! - [`pairs`] — [`pairs::PairsAnalyzer`], an Engle-Granger cointegration and
//!   z-score signal over two price series.
//! - [`log`] — the order/trade journal collaborator, in-memory or (behind
//!   the `journal` feature) a memory-mapped, CRC32-checked file journal.
//! - [`config`] — tunables for [`engine::MatchingEngine`].
//!
//! ## Concurrency model
//!
//! Each [`book::OrderBook`] serializes mutation through a single mutex while
//! keeping its price-level collections lock-free for concurrent readers
//! (snapshot, best bid/ask) that never block behind a writer. The
//! [`engine::MatchingEngine`] holds one book per symbol in a
//! [`dashmap::DashMap`], so distinct symbols never contend with each other.

pub mod book;
pub mod config;
pub mod engine;
pub mod log;
pub mod order;
pub mod pairs;
pub mod pool;
pub mod prelude;
pub mod risk;
pub mod trade;
mod utils;

pub use book::{BookSnapshot, OrderBook, OrderBookError, SnapshotLevel};
pub use config::EngineConfig;
pub use engine::{EngineError, EngineMetrics, MatchingEngine, MetricsSnapshot};
pub use order::{Order, OrderId, OrderKind, OrderStatus, OrderValidationError, Side};
pub use pairs::{AnalyzerError, CriticalValues, PairStatistics, PairsAnalyzer};
pub use pool::{Envelope, Pool};
pub use risk::{
    InMemoryPositionStore, InMemoryRiskLimitStore, OrderIntent, Position, PositionStore, RiskError,
    RiskLimit, RiskLimitStore, RiskLimitType, RiskValidator, ValidationResult,
};
pub use trade::Trade;
