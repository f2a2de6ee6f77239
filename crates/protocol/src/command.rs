//! The fixed command table and the MVEL payload codec.
//!
//! Command names are matched exactly and case-sensitively. Each command has
//! one fixed payload length, declared here so the dispatcher validates it in
//! a single place — handlers never see a wrong-sized payload.

/// Every command the device understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    /// Set motor velocity, optional auto-stop duration.
    Mvel,
    /// Immediate motor stop.
    Mstop,
    /// Replace the display buffer and refresh the panel.
    Dimg,
    /// Blank the display buffer and refresh the panel.
    Dclear,
    /// Report display-buffer fill level and readiness.
    Dstatus,
    /// Stop motors, clear buffer, restart the device.
    Sreset,
    /// Stop motors, enter deep sleep.
    Shalt,
    /// Liveness probe.
    Sping,
}

impl CommandKind {
    /// Exact, case-sensitive lookup of a wire command name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "MVEL" => Some(Self::Mvel),
            "MSTOP" => Some(Self::Mstop),
            "DIMG" => Some(Self::Dimg),
            "DCLEAR" => Some(Self::Dclear),
            "DSTATUS" => Some(Self::Dstatus),
            "SRESET" => Some(Self::Sreset),
            "SHALT" => Some(Self::Shalt),
            "SPING" => Some(Self::Sping),
            _ => None,
        }
    }

    /// Wire spelling of the command.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mvel => "MVEL",
            Self::Mstop => "MSTOP",
            Self::Dimg => "DIMG",
            Self::Dclear => "DCLEAR",
            Self::Dstatus => "DSTATUS",
            Self::Sreset => "SRESET",
            Self::Shalt => "SHALT",
            Self::Sping => "SPING",
        }
    }

    /// The exact payload length this command requires.
    ///
    /// `DIMG` carries a full packed image, so its length is the panel's
    /// buffer capacity, supplied by the caller; every other command is fixed.
    #[must_use]
    pub const fn expected_payload_len(self, image_capacity: usize) -> usize {
        match self {
            Self::Mvel => MotorVelocity::WIRE_SIZE,
            Self::Dimg => image_capacity,
            Self::Mstop
            | Self::Dclear
            | Self::Dstatus
            | Self::Sreset
            | Self::Shalt
            | Self::Sping => 0,
        }
    }
}

/// Decoded MVEL payload: signed speeds and an optional auto-stop duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorVelocity {
    /// Left wheel speed, nominally in [-255, 255].
    pub left: i16,
    /// Right wheel speed, nominally in [-255, 255].
    pub right: i16,
    /// Auto-stop deadline in milliseconds; 0 means run until stopped.
    pub duration_ms: u16,
}

impl MotorVelocity {
    /// Encoded size on the wire: `i16 left, i16 right, u16 duration`, LE.
    pub const WIRE_SIZE: usize = 6;

    /// Maximum speed magnitude the motor driver accepts (PWM duty range).
    pub const MAX_SPEED: i16 = 255;

    /// Decode from exactly [`Self::WIRE_SIZE`] little-endian bytes.
    #[must_use]
    pub fn decode(payload: &[u8]) -> Option<Self> {
        if payload.len() != Self::WIRE_SIZE {
            return None;
        }
        let left = i16::from_le_bytes([*payload.first()?, *payload.get(1)?]);
        let right = i16::from_le_bytes([*payload.get(2)?, *payload.get(3)?]);
        let duration_ms = u16::from_le_bytes([*payload.get(4)?, *payload.get(5)?]);
        Some(Self {
            left,
            right,
            duration_ms,
        })
    }

    /// Encode to the wire layout.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let l = self.left.to_le_bytes();
        let r = self.right.to_le_bytes();
        let d = self.duration_ms.to_le_bytes();
        [l[0], l[1], r[0], r[1], d[0], d[1]]
    }

    /// Copy with both speeds clamped to `[-MAX_SPEED, MAX_SPEED]`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            left: self.left.clamp(-Self::MAX_SPEED, Self::MAX_SPEED),
            right: self.right.clamp(-Self::MAX_SPEED, Self::MAX_SPEED),
            duration_ms: self.duration_ms,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        assert_eq!(CommandKind::from_name("MVEL"), Some(CommandKind::Mvel));
        assert_eq!(CommandKind::from_name("mvel"), None);
        assert_eq!(CommandKind::from_name("MVEL "), None);
        assert_eq!(CommandKind::from_name("FOO"), None);
        assert_eq!(CommandKind::from_name(""), None);
    }

    #[test]
    fn every_name_roundtrips() {
        for kind in [
            CommandKind::Mvel,
            CommandKind::Mstop,
            CommandKind::Dimg,
            CommandKind::Dclear,
            CommandKind::Dstatus,
            CommandKind::Sreset,
            CommandKind::Shalt,
            CommandKind::Sping,
        ] {
            assert_eq!(CommandKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn expected_lengths_match_the_table() {
        assert_eq!(CommandKind::Mvel.expected_payload_len(15_000), 6);
        assert_eq!(CommandKind::Dimg.expected_payload_len(15_000), 15_000);
        assert_eq!(CommandKind::Mstop.expected_payload_len(15_000), 0);
        assert_eq!(CommandKind::Sping.expected_payload_len(15_000), 0);
    }

    #[test]
    fn mvel_codec_roundtrip() {
        let v = MotorVelocity {
            left: -120,
            right: 255,
            duration_ms: 1500,
        };
        assert_eq!(MotorVelocity::decode(&v.encode()), Some(v));
    }

    #[test]
    fn mvel_wire_layout_is_little_endian() {
        let v = MotorVelocity {
            left: 0x0102,
            right: -2,
            duration_ms: 0x0304,
        };
        assert_eq!(v.encode(), [0x02, 0x01, 0xFE, 0xFF, 0x04, 0x03]);
    }

    #[test]
    fn mvel_decode_requires_exact_size() {
        assert_eq!(MotorVelocity::decode(&[0; 5]), None);
        assert_eq!(MotorVelocity::decode(&[0; 7]), None);
        assert!(MotorVelocity::decode(&[0; 6]).is_some());
    }

    #[test]
    fn clamping_bounds_both_speeds() {
        let v = MotorVelocity {
            left: -300,
            right: 300,
            duration_ms: 1000,
        };
        let c = v.clamped();
        assert_eq!(c.left, -255);
        assert_eq!(c.right, 255);
        assert_eq!(c.duration_ms, 1000);
    }
}
