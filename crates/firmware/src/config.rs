//! Device-wide constants.

/// Panel width in pixels.
pub const PANEL_WIDTH: usize = 400;

/// Panel height in pixels.
pub const PANEL_HEIGHT: usize = 300;

/// Packed 1-bit image size: 400 × 300 / 8 bytes.
pub const IMAGE_BUFFER_SIZE: usize = PANEL_WIDTH * PANEL_HEIGHT / 8;

/// Byte value of a blank (all-white) e-paper buffer.
pub const BLANK_BYTE: u8 = 0xFF;

/// Link watchdog threshold, milliseconds.
///
/// Matches the host's serial timeout: if no valid frame arrives for this
/// long while the motors run, the supervisor forces a stop. This is the
/// only loss-of-link protection for indefinite-duration motion.
pub const WATCHDOG_TIMEOUT_MS: u64 = 5_000;
