//! Monotonic time source.

/// Millisecond monotonic clock.
///
/// Only differences between readings are meaningful; the epoch is boot.
/// Motor auto-stop deadlines and the link watchdog compare against this —
/// a wall clock that can step backwards must never back it.
pub trait MonotonicClock {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;
}

// Reading time needs no mutation, so a shared reference is itself a clock.
// Tests rely on this: the control loop holds `&MockClock` while the test
// keeps advancing the original.
impl<T: MonotonicClock + ?Sized> MonotonicClock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
