//! Command-frame encoding.
//!
//! The device side only ever *parses* frames (see [`crate::parser`]); the
//! encoder here is the host-direction counterpart, used by integration tests
//! to drive a device end byte-for-byte and available to a host-side crate.
//!
//! Layout:
//! ```text
//! <NAME><LEN>\n<LEN bytes of payload>\n<4 hex-digit CRC>\n
//! ```

use core::fmt::Write;

use thiserror_no_std::Error;

use crate::crc;

/// Longest command name on the wire (`DSTATUS` is 7 bytes) plus headroom.
pub const MAX_COMMAND_LEN: usize = 8;

/// Errors from [`encode_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// The command name exceeds [`MAX_COMMAND_LEN`].
    #[error("command name too long")]
    CommandTooLong,
    /// The output buffer cannot hold the encoded frame.
    #[error("encode buffer overflow")]
    BufferOverflow,
}

/// Encode one command frame into `out`.
///
/// `out` is cleared first. `N` must cover name + length digits + payload +
/// checksum + three terminators.
pub fn encode_frame<const N: usize>(
    command: &str,
    payload: &[u8],
    out: &mut heapless::Vec<u8, N>,
) -> Result<(), EncodeError> {
    if command.len() > MAX_COMMAND_LEN {
        return Err(EncodeError::CommandTooLong);
    }
    out.clear();

    let mut header: heapless::String<{ MAX_COMMAND_LEN + 6 }> = heapless::String::new();
    write!(header, "{}{}", command, payload.len()).map_err(|_| EncodeError::BufferOverflow)?;

    out.extend_from_slice(header.as_bytes())
        .map_err(|_| EncodeError::BufferOverflow)?;
    out.push(b'\n').map_err(|_| EncodeError::BufferOverflow)?;
    out.extend_from_slice(payload)
        .map_err(|_| EncodeError::BufferOverflow)?;
    out.push(b'\n').map_err(|_| EncodeError::BufferOverflow)?;
    out.extend_from_slice(&crc::to_hex(crc::checksum(payload)))
        .map_err(|_| EncodeError::BufferOverflow)?;
    out.push(b'\n').map_err(|_| EncodeError::BufferOverflow)?;
    Ok(())
}
