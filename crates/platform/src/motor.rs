//! Motor output abstraction.
//!
//! Each drive side is a rotation-direction pin pair plus a PWM duty output.
//! The trait takes the already-resolved direction and magnitude; clamping
//! and the velocity state machine live above it in the firmware crate.

/// Drive side selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Side {
    /// Left wheel.
    Left,
    /// Right wheel.
    Right,
}

/// Rotation direction, from the sign of the commanded speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Positive speeds.
    Forward,
    /// Negative speeds.
    Reverse,
}

/// Dual-channel motor driver outputs.
pub trait MotorOutputs {
    /// Driver error type.
    type Error: core::fmt::Debug;

    /// Apply direction and PWM duty (0–255) to one side.
    ///
    /// Duty 0 must de-energise the channel regardless of direction.
    fn set_channel(&mut self, side: Side, direction: Direction, duty: u8)
        -> Result<(), Self::Error>;
}
