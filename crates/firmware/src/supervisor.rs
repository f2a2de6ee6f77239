//! Link watchdog and post-response system actions.
//!
//! The watchdog tracks the arrival time of the last CRC-valid frame. When
//! the link has been silent past the threshold while the motors run, the
//! control loop forces a stop — the only protection for an
//! indefinite-duration motion command whose host has gone away.

/// System action deferred until after the response has been flushed, so the
/// host sees the `OK` before the device disappears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PostAction {
    /// Soft-reset the device.
    Restart,
    /// Enter deep sleep.
    Halt,
}

/// Host-link watchdog.
#[derive(Debug, Clone, Copy)]
pub struct Supervisor {
    timeout_ms: u64,
    last_frame_ms: u64,
}

impl Supervisor {
    /// Watchdog armed as of `now_ms` with the given silence threshold.
    #[must_use]
    pub fn new(timeout_ms: u64, now_ms: u64) -> Self {
        Self {
            timeout_ms,
            last_frame_ms: now_ms,
        }
    }

    /// Record a successfully dispatched frame.
    ///
    /// Any CRC-valid frame counts, even one that earns an `ERR` response:
    /// the host is demonstrably still there.
    pub fn note_frame(&mut self, now_ms: u64) {
        self.last_frame_ms = now_ms;
    }

    /// `true` once the link has been silent longer than the threshold.
    #[must_use]
    pub fn link_lost(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_frame_ms) > self.timeout_ms
    }
}
