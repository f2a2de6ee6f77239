//! Wire checksum: CRC-CCITT over the frame payload.
//!
//! `CRC_16_IBM_3740` is the catalogue name for what the serial protocol
//! calls CRC-CCITT: polynomial 0x1021, initial register 0xFFFF, MSB-first,
//! no final XOR. The checksum covers the payload bytes only — never the
//! header line.

use crc::{Crc, CRC_16_IBM_3740};

/// The wire checksum algorithm.
pub const CRC_CCITT: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Compute the checksum of a payload.
#[must_use]
pub fn checksum(payload: &[u8]) -> u16 {
    CRC_CCITT.checksum(payload)
}

/// Render a checksum as four uppercase hex digits, as it appears on the wire.
///
/// # Safety (lint allow)
/// Every index is masked with `& 0xF` and therefore within `[0, 16)`.
#[must_use]
#[allow(clippy::indexing_slicing)]
pub fn to_hex(value: u16) -> [u8; 4] {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    [
        DIGITS[usize::from(value >> 12) & 0xF],
        DIGITS[usize::from(value >> 8) & 0xF],
        DIGITS[usize::from(value >> 4) & 0xF],
        DIGITS[usize::from(value) & 0xF],
    ]
}

/// Parse a hex-digit checksum field (1–4 digits, either case).
///
/// Returns `None` for an empty field or any non-hex byte.
#[must_use]
pub fn parse_hex(digits: &[u8]) -> Option<u16> {
    if digits.is_empty() || digits.len() > 4 {
        return None;
    }
    let mut value: u16 = 0;
    for &b in digits {
        // Subtractions are within the matched ASCII ranges; no underflow.
        #[allow(clippy::arithmetic_side_effects)]
        let nibble = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => return None,
        };
        // Bounded by the length check above: at most 4 nibbles fit in a u16.
        value = (value << 4) | u16::from(nibble);
    }
    Some(value)
}
