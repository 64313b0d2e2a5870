//! Small time helpers shared across the crate.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Used for `Trade::timestamp` and journal entries. Not used for order
/// time-priority — see [`monotonic_nanos`] for that.
pub fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_millis() as u64
}

/// A monotonically increasing nanosecond counter used for `Order::created_at`
/// / `updated_at`.
///
/// Wall-clock time is not monotonic across NTP adjustments, and the spec
/// requires time priority to be a stable total order. A process-wide atomic
/// counter seeded from the current time guarantees strictly increasing
/// values regardless of clock skew.
pub fn monotonic_nanos() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_nanos() as u64;

    // Ensure strict monotonicity even if two calls land in the same
    // nanosecond, or if `wall` ever goes backwards.
    let mut prev = COUNTER.load(Ordering::Relaxed);
    loop {
        let next = if wall > prev { wall } else { prev + 1 };
        match COUNTER.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => prev = actual,
        }
    }
}
