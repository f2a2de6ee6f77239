//! Serial link abstraction.
//!
//! The control loop drains this one byte at a time (poll-driven intake) and
//! writes whole responses back. On hardware this wraps a UART with a
//! receive FIFO or DMA ring; reads must never block.

/// Byte-stream link to the host.
pub trait SerialLink {
    /// Transport error type.
    type Error: core::fmt::Debug;

    /// Take the next received byte, or `None` when the FIFO is empty.
    ///
    /// Must not block: the motor-safety tick runs on the same loop.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Queue all of `bytes` for transmission.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Block until queued bytes have left the device.
    ///
    /// Called before restart/halt so the host sees the final response.
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
