//! A single price level: a FIFO queue of resting orders sharing one price
//! (or, for stop collections, one trigger price).
//!
//! Mutation is always performed by a caller already holding the owning
//! book's matching lock, so the internal queue only needs a plain `Mutex`
//! for interior mutability; the aggregate counters are kept as atomics so
//! that [`PriceLevel::total_quantity`] / [`PriceLevel::order_count`] can be
//! read lock-free by `snapshot`, `best_bid`, `best_ask` readers running
//! concurrently with a mutation in progress (spec §5).

use crate::order::{Order, OrderId};
use crate::pool::Pool;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// A price-time-ordered FIFO queue of orders resting at one price.
pub struct PriceLevel {
    orders: Mutex<VecDeque<Order>>,
    total_quantity: AtomicU64,
    order_count: AtomicUsize,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self {
            orders: Mutex::new(VecDeque::new()),
            total_quantity: AtomicU64::new(0),
            order_count: AtomicUsize::new(0),
        }
    }

    /// Appends an order to the back of the FIFO queue (time priority).
    pub fn push_back(&self, order: Order) {
        let remaining = order.remaining();
        let mut guard = self.orders.lock().expect("price level mutex poisoned");
        guard.push_back(order);
        self.total_quantity.fetch_add(remaining, Ordering::Relaxed);
        self.order_count.fetch_add(1, Ordering::Relaxed);
    }

    /// True if the queue currently has no orders.
    pub fn is_empty(&self) -> bool {
        self.order_count.load(Ordering::Relaxed) == 0
    }

    /// Peeks the remaining quantity of the order at the front of the queue,
    /// without cloning it. Used to size a prospective fill before
    /// committing it via [`Self::fill_front`].
    pub fn front_remaining(&self) -> Option<u64> {
        self.orders
            .lock()
            .expect("price level mutex poisoned")
            .front()
            .map(Order::remaining)
    }

    /// Applies a fill to the order at the front of the queue. If it becomes
    /// fully filled, it is popped and returned — the caller is responsible
    /// for returning it to `pool` once its id has been read (spec §4.1: a
    /// fully filled order is destroyed and returned to the pool). If it
    /// stays partially filled, the caller only ever needs its id, so a
    /// scratch [`Order`] acquired from `pool` carries just that instead of
    /// cloning every field (and reallocating every owned `String`) on the
    /// resting order.
    pub fn fill_front(&self, quantity: u64, pool: &Pool<Order>) -> (Order, bool) {
        let mut guard = self.orders.lock().expect("price level mutex poisoned");
        let front = guard.front_mut().expect("fill_front called on empty level");
        front.apply_fill(quantity);
        self.total_quantity.fetch_sub(quantity, Ordering::Relaxed);
        let fully_filled = front.remaining() == 0;
        let order = if fully_filled {
            let order = guard.pop_front().expect("front just verified present");
            self.order_count.fetch_sub(1, Ordering::Relaxed);
            order
        } else {
            let mut scratch = pool.acquire();
            scratch.order_id.clear();
            scratch.order_id.push_str(&front.order_id);
            scratch
        };
        (order, fully_filled)
    }

    /// Pops the order at the front of the queue unconditionally (used when
    /// draining a triggered stop collection, not filling against it).
    pub fn pop_front(&self) -> Option<Order> {
        let mut guard = self.orders.lock().expect("price level mutex poisoned");
        let order = guard.pop_front()?;
        self.total_quantity
            .fetch_sub(order.remaining(), Ordering::Relaxed);
        self.order_count.fetch_sub(1, Ordering::Relaxed);
        Some(order)
    }

    /// Removes a specific order by id (cancellation), wherever it sits in
    /// the queue. Returns the removed order, if present.
    pub fn remove(&self, order_id: &OrderId) -> Option<Order> {
        let mut guard = self.orders.lock().expect("price level mutex poisoned");
        let index = guard.iter().position(|o| &o.order_id == order_id)?;
        let order = guard.remove(index).expect("index just located");
        self.total_quantity
            .fetch_sub(order.remaining(), Ordering::Relaxed);
        self.order_count.fetch_sub(1, Ordering::Relaxed);
        Some(order)
    }

    pub fn total_quantity(&self) -> u64 {
        self.total_quantity.load(Ordering::Relaxed)
    }

    pub fn order_count(&self) -> usize {
        self.order_count.load(Ordering::Relaxed)
    }
}
