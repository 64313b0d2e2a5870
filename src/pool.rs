//! Pool Allocator (spec §4.1): thread-safe, per-type reusable object stores.
//!
//! Amortizes allocation of short-lived `Order`/`Trade`/envelope records on
//! the matching hot path. `acquire` returns a reset record (fresh or
//! recycled); `release` returns a record to the pool after resetting it so
//! the next acquirer never observes stale state. Exhaustion is not an error
//! condition — the pool simply allocates fresh.

use crossbeam::queue::SegQueue;

/// A lock-free object pool for type `T`.
///
/// Backed by [`SegQueue`], an unbounded MPMC queue, so `acquire`/`release`
/// can be called concurrently from any thread without contention beyond
/// what the queue itself provides. `reset` is applied on release, guaranteeing
/// a released record is never read by its releaser afterward and that the
/// next `acquire` sees default-shaped state (length zero, not capacity, for
/// any owned collection a `T` might carry).
pub struct Pool<T> {
    free: SegQueue<T>,
    reset: fn(&mut T),
}

impl<T> Pool<T> {
    /// Creates an empty pool. `reset` must restore `item` to a blank,
    /// reusable state (clearing lengths of owned collections without
    /// necessarily freeing their capacity).
    pub fn new(reset: fn(&mut T)) -> Self {
        Self {
            free: SegQueue::new(),
            reset,
        }
    }

    /// Number of records currently parked in the pool, for diagnostics.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}

impl<T: Default> Pool<T> {
    /// Acquires a record: a recycled one (reset) if available, otherwise a
    /// fresh `T::default()`.
    pub fn acquire(&self) -> T {
        match self.free.pop() {
            Some(mut item) => {
                (self.reset)(&mut item);
                item
            }
            None => T::default(),
        }
    }

    /// Returns `item` to the pool for reuse. The caller must not read
    /// `item` after this call.
    pub fn release(&self, mut item: T) {
        (self.reset)(&mut item);
        self.free.push(item);
    }

    /// Pre-populates the pool with `count` freshly defaulted records, so
    /// that `count` acquisitions under startup load are served from the
    /// free list rather than constructing `T::default()` cold. Driven by
    /// `EngineConfig::pool_initial_capacity` (spec §6 "CLI/config
    /// surface").
    pub fn prefill(&self, count: usize) {
        for _ in 0..count {
            self.free.push(T::default());
        }
    }
}

/// A lightweight message envelope recycled by the pool, used to carry a
/// `Trade` through the matching hot path's outbound channel without a fresh
/// heap allocation per event (spec §4.1 "message envelopes").
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: Option<T>,
}

impl<T> Default for Envelope<T> {
    /// `Option<T>::None` never needs `T: Default`, so this is written by
    /// hand instead of derived — deriving would wrongly require it.
    fn default() -> Self {
        Self { payload: None }
    }
}

impl<T> Envelope<T> {
    pub fn reset(envelope: &mut Self) {
        envelope.payload = None;
    }
}
