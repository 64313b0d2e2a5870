//! Engine configuration (spec §A ambient stack).
//!
//! Immutable once the engine is built. `Default` gives sane values for
//! embedding in tests or a minimal binary; a transport layer loads overrides
//! from TOML/JSON/env and constructs this with [`serde::Deserialize`] before
//! handing it to [`crate::engine::MatchingEngine::new`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs for a [`crate::engine::MatchingEngine`] instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Target average `place_order` latency in nanoseconds; the latency
    /// monitor emits a warning when the EMA exceeds this (spec §4.3).
    pub target_latency_nanos: u64,
    /// How often the latency monitor wakes to check the average against
    /// `target_latency_nanos`.
    pub latency_check_interval: Duration,
    /// Capacity of the bounded outbound trade channel; beyond this, trades
    /// are dropped and `trades_dropped` increments (spec §4.3).
    pub trade_channel_capacity: usize,
    /// Initial size to pre-warm the order/trade object pools with.
    pub pool_initial_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_latency_nanos: 100_000, // 100 microseconds
            latency_check_interval: Duration::from_secs(1),
            trade_channel_capacity: 4096,
            pool_initial_capacity: 256,
        }
    }
}

impl EngineConfig {
    pub fn with_target_latency_nanos(mut self, nanos: u64) -> Self {
        self.target_latency_nanos = nanos;
        self
    }

    pub fn with_trade_channel_capacity(mut self, capacity: usize) -> Self {
        self.trade_channel_capacity = capacity;
        self
    }
}
