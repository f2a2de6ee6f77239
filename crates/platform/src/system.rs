//! Device restart and sleep primitives.

/// Whole-device power control.
///
/// On hardware both calls never return; the mock records them instead so
/// the supervisor's ordering (respond, flush, then act) stays testable.
pub trait SystemControl {
    /// Restart the device (soft reset).
    fn restart(&mut self);

    /// Enter the lowest-power sleep mode.
    ///
    /// Irrecoverable without an external reset.
    fn deep_sleep(&mut self);
}
