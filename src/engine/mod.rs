//! Matching Engine (spec §4.3): multiplexes symbols to their order books,
//! owns the outbound trade stream, and maintains engine-wide metrics.

mod error;
mod metrics;

pub use error::EngineError;
pub use metrics::{EngineMetrics, MetricsSnapshot};

use crate::book::{BookSnapshot, OrderBook};
use crate::config::EngineConfig;
use crate::log::{LogEntry, OrderLog};
use crate::order::{Order, OrderId};
use crate::pool::{Envelope, Pool};
use crate::trade::Trade;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Multi-symbol front door onto the per-symbol order books.
///
/// The symbol-to-book map is a [`DashMap`]: reads (every `place_order`) are
/// lock-striped and concurrent; writes (lazily creating a book for a symbol
/// seen for the first time) are rare. Once created, a book's `Arc` address
/// never changes (spec §4.3 "symbol-to-book map").
pub struct MatchingEngine {
    books: DashMap<String, Arc<OrderBook>>,
    trade_tx: SyncSender<Envelope<Trade>>,
    trade_rx: Mutex<Receiver<Envelope<Trade>>>,
    trade_pool: Pool<Envelope<Trade>>,
    metrics: Arc<EngineMetrics>,
    shutting_down: Arc<AtomicBool>,
    config: EngineConfig,
    order_log: Option<Arc<dyn OrderLog>>,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::build(config, None)
    }

    /// Builds an engine that writes every admitted order and emitted trade
    /// through `order_log` before publishing it (spec §6 / SPEC_FULL §B).
    /// Append failures are logged and otherwise non-fatal — the match has
    /// already committed against the book.
    pub fn with_order_log(config: EngineConfig, order_log: Arc<dyn OrderLog>) -> Self {
        Self::build(config, Some(order_log))
    }

    fn build(config: EngineConfig, order_log: Option<Arc<dyn OrderLog>>) -> Self {
        let (trade_tx, trade_rx) = mpsc::sync_channel(config.trade_channel_capacity);
        let trade_pool = Pool::new(Envelope::reset);
        trade_pool.prefill(config.pool_initial_capacity);
        let metrics = Arc::new(EngineMetrics::new());
        let shutting_down = Arc::new(AtomicBool::new(false));

        spawn_latency_monitor(
            Arc::clone(&metrics),
            Arc::clone(&shutting_down),
            config.target_latency_nanos,
            config.latency_check_interval,
        );

        Self {
            books: DashMap::new(),
            trade_tx,
            trade_rx: Mutex::new(trade_rx),
            trade_pool,
            metrics,
            shutting_down,
            config,
            order_log,
        }
    }

    fn book_for(&self, symbol: &str) -> Arc<OrderBook> {
        self.books
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(OrderBook::with_pool_capacity(symbol, self.config.pool_initial_capacity)))
            .clone()
    }

    /// Resolves (and lazily creates) the book for `order.symbol`, matches
    /// it, records latency, writes the admitted order and its trades through
    /// the order log (if configured), and publishes every resulting trade to
    /// the outbound stream. A full stream drops the trade and increments the
    /// drop counter — the book has already committed the match, so the
    /// downstream loss is observable but never rolls back execution (spec
    /// §4.3).
    pub fn place_order(&self, order: Order) -> Result<Vec<Trade>, EngineError> {
        if self.shutting_down.load(Ordering::Acquire) {
            return Err(EngineError::ShuttingDown);
        }

        let logged_order = self.order_log.as_ref().map(|_| order.clone());

        let start = Instant::now();
        let book = self.book_for(&order.symbol);
        let trades = book.add_order(order)?;
        let elapsed_nanos = start.elapsed().as_nanos() as u64;

        self.metrics.record_order(elapsed_nanos, trades.len());

        if let Some(log) = &self.order_log {
            if let Some(admitted) = logged_order
                && let Err(err) = log.append(&LogEntry::Order(admitted))
            {
                warn!(error = %err, "order log append failed, continuing without durability for this entry");
            }
            for trade in &trades {
                if let Err(err) = log.append(&LogEntry::Trade(trade.clone())) {
                    warn!(error = %err, "trade log append failed, continuing without durability for this entry");
                }
            }
        }

        for trade in &trades {
            let mut envelope = self.trade_pool.acquire();
            envelope.payload = Some(trade.clone());
            match self.trade_tx.try_send(envelope) {
                Ok(()) => {}
                Err(TrySendError::Full(envelope)) => {
                    self.metrics.record_dropped_trade();
                    warn!(trade_id = %trade.trade_id, "outbound trade stream full, trade dropped");
                    self.trade_pool.release(envelope);
                }
                Err(TrySendError::Disconnected(envelope)) => {
                    error!("outbound trade stream has no receiver, trade dropped");
                    self.metrics.record_dropped_trade();
                    self.trade_pool.release(envelope);
                }
            }
        }

        Ok(trades)
    }

    /// Delegates to the symbol's book.
    ///
    /// # Errors
    /// Returns [`EngineError::BookNotFound`] if `symbol` has no book.
    pub fn cancel_order(&self, order_id: &OrderId, symbol: &str) -> Result<(), EngineError> {
        let book = self
            .books
            .get(symbol)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EngineError::BookNotFound {
                symbol: symbol.to_string(),
            })?;
        book.cancel_order(order_id)?;
        Ok(())
    }

    /// Delegates to the symbol's book.
    ///
    /// # Errors
    /// Returns [`EngineError::BookNotFound`] if `symbol` has no book.
    pub fn snapshot(&self, symbol: &str, depth: usize) -> Result<BookSnapshot, EngineError> {
        let book = self
            .books
            .get(symbol)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EngineError::BookNotFound {
                symbol: symbol.to_string(),
            })?;
        Ok(book.snapshot(depth))
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Pulls one published trade off the outbound stream, blocking up to
    /// `timeout`. Intended for a single downstream consumer (a transport
    /// layer, out of scope here).
    pub fn recv_trade(&self, timeout: Duration) -> Option<Trade> {
        let mut envelope = self
            .trade_rx
            .lock()
            .expect("trade receiver mutex poisoned")
            .recv_timeout(timeout)
            .ok()?;
        let trade = envelope.payload.take();
        self.trade_pool.release(envelope);
        trade
    }

    /// Rejects new submissions immediately, then drains whatever trades are
    /// still buffered in the outbound stream until either it is empty or
    /// `deadline` elapses. The background latency monitor observes
    /// `shutting_down` and exits on its own within one `latency_check_interval`
    /// — this does not wait on it.
    pub fn shutdown(&self, deadline: Duration) {
        self.shutting_down.store(true, Ordering::Release);
        info!("matching engine shutting down, draining outbound trade stream");
        let start = Instant::now();
        let rx = self.trade_rx.lock().expect("trade receiver mutex poisoned");
        while start.elapsed() < deadline {
            match rx.recv_timeout(deadline.saturating_sub(start.elapsed())) {
                Ok(envelope) => {
                    self.trade_pool.release(envelope);
                    continue;
                }
                Err(_) => break,
            }
        }
    }
}

/// Background monitor for spec §4.3: wakes every `interval` and warns when
/// the EMA average latency exceeds `target_nanos`. Exits once `shutting_down`
/// is observed set, so it never outlives its engine by more than one
/// `interval`.
fn spawn_latency_monitor(
    metrics: Arc<EngineMetrics>,
    shutting_down: Arc<AtomicBool>,
    target_nanos: u64,
    interval: Duration,
) {
    thread::spawn(move || {
        while !shutting_down.load(Ordering::Acquire) {
            thread::sleep(interval);
            if shutting_down.load(Ordering::Acquire) {
                break;
            }
            let avg = metrics.snapshot().avg_nanos;
            if avg > target_nanos {
                warn!(
                    avg_nanos = avg,
                    target = target_nanos,
                    "average place_order latency exceeded target"
                );
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::InMemoryOrderLog;
    use crate::order::{OrderKind, Side};

    fn limit(id: &str, symbol: &str, side: Side, price: u64, qty: u64) -> Order {
        Order::new(
            Some(id.to_string()),
            symbol,
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

    #[test]
    fn lazily_creates_books_per_symbol() {
        let engine = MatchingEngine::new(EngineConfig::default());
        engine
            .place_order(limit("b1", "BTC/USD", Side::Buy, 100, 5))
            .unwrap();
        engine
            .place_order(limit("e1", "ETH/USD", Side::Buy, 10, 5))
            .unwrap();
        assert_eq!(engine.snapshot("BTC/USD", 10).unwrap().bids.len(), 1);
        assert_eq!(engine.snapshot("ETH/USD", 10).unwrap().bids.len(), 1);
    }

    #[test]
    fn unknown_symbol_cancel_fails() {
        let engine = MatchingEngine::new(EngineConfig::default());
        assert!(matches!(
            engine.cancel_order(&"x".to_string(), "NOPE"),
            Err(EngineError::BookNotFound { .. })
        ));
    }

    #[test]
    fn trades_are_published_to_outbound_stream() {
        let engine = MatchingEngine::new(EngineConfig::default());
        engine
            .place_order(limit("a1", "BTC/USD", Side::Sell, 100, 10))
            .unwrap();
        engine
            .place_order(limit("b1", "BTC/USD", Side::Buy, 100, 5))
            .unwrap();
        let trade = engine.recv_trade(Duration::from_millis(100));
        assert!(trade.is_some());
        assert_eq!(engine.metrics().trades_executed, 1);
    }

    #[test]
    fn shutdown_rejects_new_submissions() {
        let engine = MatchingEngine::new(EngineConfig::default());
        engine.shutdown(Duration::from_millis(10));
        assert!(matches!(
            engine.place_order(limit("a1", "BTC/USD", Side::Buy, 100, 5)),
            Err(EngineError::ShuttingDown)
        ));
    }

    #[test]
    fn admitted_orders_and_trades_are_written_through_the_log() {
        let log = Arc::new(InMemoryOrderLog::new());
        let engine = MatchingEngine::with_order_log(EngineConfig::default(), log.clone());
        engine
            .place_order(limit("a1", "BTC/USD", Side::Sell, 100, 10))
            .unwrap();
        engine
            .place_order(limit("b1", "BTC/USD", Side::Buy, 100, 5))
            .unwrap();

        let replayed = log.replay().unwrap();
        let orders = replayed
            .iter()
            .filter(|e| matches!(e, Ok(crate::log::LogEntry::Order(_))))
            .count();
        let trades = replayed
            .iter()
            .filter(|e| matches!(e, Ok(crate::log::LogEntry::Trade(_))))
            .count();
        assert_eq!(orders, 2);
        assert_eq!(trades, 1);
    }

    #[test]
    fn invalid_order_is_not_logged() {
        let log = Arc::new(InMemoryOrderLog::new());
        let engine = MatchingEngine::with_order_log(EngineConfig::default(), log.clone());
        let bad = Order {
            quantity: 0,
            ..limit("a1", "BTC/USD", Side::Buy, 100, 5)
        };
        assert!(engine.place_order(bad).is_err());
        assert!(log.replay().unwrap().is_empty());
    }
}
