//! Bistable display panel abstraction.
//!
//! A bistable (e-paper) panel keeps its image without power but needs a
//! multi-step sequence to change it: hardware reset, controller init,
//! RAM write, refresh trigger, busy wait, deep sleep. [`DisplayPanel::show`]
//! performs that whole sequence behind one blocking call — the control loop
//! is single-threaded and accepts that a refresh stalls it.
//!
//! The buffer itself (packed 1-bit pixels, fill cursor, readiness) is owned
//! by the firmware's display controller; this trait only moves finished
//! frames to glass.

/// Bistable display panel.
pub trait DisplayPanel {
    /// Panel/driver error type.
    ///
    /// `Display` is required so a failed refresh can be reported to the
    /// host verbatim in an `ERR` response.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Packed frame size the panel expects, in bytes (width × height / 8).
    fn frame_len(&self) -> usize;

    /// Run the full show sequence with `frame` as the new image.
    ///
    /// Blocks until the panel has finished refreshing and entered sleep,
    /// typically for several seconds. Implementations must bound their
    /// busy waits and fail rather than hang.
    fn show(&mut self, frame: &[u8]) -> Result<(), Self::Error>;
}
