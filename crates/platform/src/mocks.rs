//! Mock implementations for testing.
//!
//! Recording mocks for every platform trait, used by the firmware crate's
//! unit and integration tests. Enabled for this crate's own tests and for
//! downstream crates via the `std` feature.

#![cfg(any(test, feature = "std"))]
#![allow(clippy::unwrap_used)]
#![allow(clippy::arithmetic_side_effects)]

use core::cell::Cell;

use crate::{Direction, DisplayPanel, MonotonicClock, MotorOutputs, SerialLink, Side, SystemControl};

// ---------------------------------------------------------------------------
// MockLink
// ---------------------------------------------------------------------------

/// Receive-queue capacity: one full image frame plus header and checksum.
const RX_CAPACITY: usize = 16_384;

/// Transmit-capture capacity: several encoded responses.
const TX_CAPACITY: usize = 1_024;

/// In-memory serial link: a receive queue the test fills and a transmit
/// buffer the test inspects.
pub struct MockLink {
    rx: heapless::Deque<u8, RX_CAPACITY>,
    tx: heapless::Vec<u8, TX_CAPACITY>,
    flush_count: usize,
}

impl MockLink {
    /// Create an empty link.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rx: heapless::Deque::new(),
            tx: heapless::Vec::new(),
            flush_count: 0,
        }
    }

    /// Queue bytes for the device to receive.
    ///
    /// # Panics
    /// Panics if the queue overflows — a test bug, not a runtime condition.
    pub fn feed(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.rx.push_back(b).unwrap();
        }
    }

    /// Everything the device has transmitted so far.
    #[must_use]
    pub fn transmitted(&self) -> &[u8] {
        &self.tx
    }

    /// Drain and return the transmit capture.
    pub fn take_transmitted(&mut self) -> heapless::Vec<u8, TX_CAPACITY> {
        core::mem::take(&mut self.tx)
    }

    /// Number of `flush` calls observed.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.flush_count
    }
}

impl Default for MockLink {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialLink for MockLink {
    type Error = core::convert::Infallible;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        Ok(self.rx.pop_front())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.tx.extend_from_slice(bytes).unwrap();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flush_count += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockClock
// ---------------------------------------------------------------------------

/// Manually advanced clock.
///
/// Interior mutability lets a test advance time while the control loop holds
/// a shared borrow.
pub struct MockClock {
    now_ms: Cell<u64>,
}

impl MockClock {
    /// Start at t = 0 ms.
    #[must_use]
    pub fn new() -> Self {
        Self { now_ms: Cell::new(0) }
    }

    /// Advance the clock.
    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get().saturating_add(ms));
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

// ---------------------------------------------------------------------------
// MockMotors
// ---------------------------------------------------------------------------

/// One recorded channel update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorUpdate {
    /// Which side was driven.
    pub side: Side,
    /// Applied direction.
    pub direction: Direction,
    /// Applied PWM duty.
    pub duty: u8,
}

/// Recording motor outputs.
pub struct MockMotors {
    history: std::vec::Vec<MotorUpdate>,
    left: (Direction, u8),
    right: (Direction, u8),
}

impl MockMotors {
    /// Both channels de-energised.
    #[must_use]
    pub fn new() -> Self {
        Self {
            history: std::vec::Vec::new(),
            left: (Direction::Forward, 0),
            right: (Direction::Forward, 0),
        }
    }

    /// Current (direction, duty) of one side.
    #[must_use]
    pub fn channel(&self, side: Side) -> (Direction, u8) {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// `true` when both duties are zero.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.left.1 == 0 && self.right.1 == 0
    }

    /// Every update in application order.
    #[must_use]
    pub fn history(&self) -> &[MotorUpdate] {
        &self.history
    }
}

impl Default for MockMotors {
    fn default() -> Self {
        Self::new()
    }
}

impl MotorOutputs for MockMotors {
    type Error = core::convert::Infallible;

    fn set_channel(
        &mut self,
        side: Side,
        direction: Direction,
        duty: u8,
    ) -> Result<(), Self::Error> {
        self.history.push(MotorUpdate { side, direction, duty });
        match side {
            Side::Left => self.left = (direction, duty),
            Side::Right => self.right = (direction, duty),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockPanel
// ---------------------------------------------------------------------------

/// Error injected by [`MockPanel::fail_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockPanelError(pub &'static str);

impl core::fmt::Display for MockPanelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.0)
    }
}

/// Recording display panel.
pub struct MockPanel {
    frame_len: usize,
    show_count: usize,
    last_frame: std::vec::Vec<u8>,
    fail_next: Option<MockPanelError>,
}

impl MockPanel {
    /// Panel expecting `frame_len`-byte frames.
    #[must_use]
    pub fn new(frame_len: usize) -> Self {
        Self {
            frame_len,
            show_count: 0,
            last_frame: std::vec::Vec::new(),
            fail_next: None,
        }
    }

    /// Number of completed show sequences.
    #[must_use]
    pub fn show_count(&self) -> usize {
        self.show_count
    }

    /// The frame most recently put on glass.
    #[must_use]
    pub fn last_frame(&self) -> &[u8] {
        &self.last_frame
    }

    /// Make the next `show` call fail with `error`.
    pub fn fail_next(&mut self, error: MockPanelError) {
        self.fail_next = Some(error);
    }
}

impl DisplayPanel for MockPanel {
    type Error = MockPanelError;

    fn frame_len(&self) -> usize {
        self.frame_len
    }

    fn show(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        self.show_count += 1;
        self.last_frame.clear();
        self.last_frame.extend_from_slice(frame);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockSystem
// ---------------------------------------------------------------------------

/// Recording restart/sleep control.
#[derive(Debug, Default)]
pub struct MockSystem {
    restart_count: usize,
    sleep_count: usize,
}

impl MockSystem {
    /// No actions recorded yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of restart requests.
    #[must_use]
    pub fn restart_count(&self) -> usize {
        self.restart_count
    }

    /// Number of deep-sleep requests.
    #[must_use]
    pub fn sleep_count(&self) -> usize {
        self.sleep_count
    }
}

impl SystemControl for MockSystem {
    fn restart(&mut self) {
        self.restart_count += 1;
    }

    fn deep_sleep(&mut self) {
        self.sleep_count += 1;
    }
}
