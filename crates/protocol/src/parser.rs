//! Incremental command-frame parser.
//!
//! Consumes the serial byte stream one byte per call, suitable for both
//! poll- and interrupt-driven intake, and yields at most one event per byte.
//!
//! The parser is a two-phase machine:
//!
//! 1. **Header** — accumulate bytes until `\n`, then split the line into a
//!    leading non-digit command name and a trailing decimal payload length.
//!    A line with no digits, an empty name, or a length beyond the payload
//!    bound is silently dropped: a malformed header cannot be told apart
//!    from partial loss, so the parser just waits to resynchronise.
//! 2. **Payload** — copy exactly the declared byte count, expect a `\n`,
//!    then read the hex checksum field up to its own `\n`.
//!
//! On checksum completion the payload CRC is computed and compared:
//! a match yields [`FrameEvent::Frame`], a mismatch yields
//! [`FrameEvent::CrcMismatch`] (the caller answers with `ERR`; the handler
//! is never invoked). Either way the parser returns to the header phase, so
//! one bad frame never poisons the next.
//!
//! All storage is fixed-size: an over-long header or checksum field drops
//! the frame and skips to the next line.

use crate::crc;
use crate::frame::MAX_COMMAND_LEN;

/// Header line bound: command name plus payload-length digits.
const MAX_HEADER_LEN: usize = MAX_COMMAND_LEN + 8;

/// Checksum field bound: four hex digits.
const MAX_CHECKSUM_DIGITS: usize = 4;

/// A completed parse step.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameEvent<'a> {
    /// A frame passed length and CRC validation and is ready to dispatch.
    Frame {
        /// Command name from the header.
        command: &'a str,
        /// Exactly the declared number of payload bytes.
        payload: &'a [u8],
    },
    /// The frame arrived intact structurally but its checksum did not match.
    CrcMismatch {
        /// CRC computed over the received payload.
        expected: u16,
        /// CRC parsed from the wire.
        received: u16,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Accumulating the header line.
    Header,
    /// Copying the declared number of payload bytes.
    Payload { remaining: usize },
    /// Expecting the `\n` that closes the payload region.
    PayloadEnd,
    /// Accumulating hex checksum digits.
    Checksum,
    /// A bound was exceeded; skip to the next line terminator.
    DiscardLine,
}

/// Per-byte frame parser, const-generic over the payload capacity.
///
/// The device instantiates this with the display-image size (the largest
/// payload any command carries); smaller deployments can shrink it.
pub struct FrameParser<const MAX_PAYLOAD: usize> {
    phase: Phase,
    header: heapless::Vec<u8, MAX_HEADER_LEN>,
    command: heapless::String<MAX_COMMAND_LEN>,
    payload: heapless::Vec<u8, MAX_PAYLOAD>,
    checksum: heapless::Vec<u8, MAX_CHECKSUM_DIGITS>,
}

impl<const MAX_PAYLOAD: usize> FrameParser<MAX_PAYLOAD> {
    /// Create a parser in the header phase.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::Header,
            header: heapless::Vec::new(),
            command: heapless::String::new(),
            payload: heapless::Vec::new(),
            checksum: heapless::Vec::new(),
        }
    }

    /// Feed one byte; returns a completed event for at most one frame.
    ///
    /// The returned borrows stay valid until the next `push` call.
    pub fn push(&mut self, byte: u8) -> Option<FrameEvent<'_>> {
        match self.phase {
            Phase::Header => self.push_header(byte),
            Phase::Payload { remaining } => {
                // remaining >= 1 in this phase; the transition below
                // re-checks for zero.
                #[allow(clippy::arithmetic_side_effects)]
                let left = remaining - 1;
                // Capacity was checked against the declared length when the
                // header was accepted, so this push cannot fail.
                let _ = self.payload.push(byte);
                self.phase = if left == 0 {
                    Phase::PayloadEnd
                } else {
                    Phase::Payload { remaining: left }
                };
                None
            }
            Phase::PayloadEnd => {
                if byte == b'\n' {
                    self.checksum.clear();
                    self.phase = Phase::Checksum;
                } else {
                    // Declared length disagreed with the sender's framing;
                    // drop the frame and resynchronise.
                    self.phase = Phase::DiscardLine;
                }
                None
            }
            Phase::Checksum => self.push_checksum(byte),
            Phase::DiscardLine => {
                if byte == b'\n' {
                    self.phase = Phase::Header;
                }
                None
            }
        }
    }

    fn push_header(&mut self, byte: u8) -> Option<FrameEvent<'_>> {
        if byte != b'\n' {
            if self.header.push(byte).is_err() {
                // Header exceeds the fixed bound: malformed, skip the line.
                self.header.clear();
                self.phase = Phase::DiscardLine;
            }
            return None;
        }

        let parsed = Self::split_header(&self.header);
        let Some((name, len)) = parsed else {
            // No digits, empty name, or bad UTF-8: silently dropped.
            self.header.clear();
            return None;
        };
        if len > MAX_PAYLOAD {
            // Larger than any payload we accept; drop rather than overflow.
            self.header.clear();
            return None;
        }

        self.command.clear();
        if self.command.push_str(name).is_err() {
            self.header.clear();
            return None;
        }
        self.header.clear();
        self.payload.clear();
        self.phase = if len == 0 {
            Phase::PayloadEnd
        } else {
            Phase::Payload { remaining: len }
        };
        None
    }

    /// Split a header line into `(command name, payload length)`.
    ///
    /// The name is the leading run of non-digit bytes, the length the
    /// trailing run of decimal digits; both must be non-empty and nothing
    /// may follow the digits.
    fn split_header(line: &[u8]) -> Option<(&str, usize)> {
        let digit_start = line.iter().position(u8::is_ascii_digit)?;
        if digit_start == 0 {
            return None;
        }
        let (name, digits) = line.split_at(digit_start);
        let name = core::str::from_utf8(name).ok()?;
        let mut len: usize = 0;
        for &d in digits {
            if !d.is_ascii_digit() {
                return None;
            }
            len = len
                .checked_mul(10)?
                .checked_add(usize::from(d.wrapping_sub(b'0')))?;
        }
        Some((name, len))
    }

    fn push_checksum(&mut self, byte: u8) -> Option<FrameEvent<'_>> {
        if byte != b'\n' {
            if self.checksum.push(byte).is_err() {
                // More than four digits: malformed, skip the line.
                self.phase = Phase::DiscardLine;
            }
            return None;
        }

        self.phase = Phase::Header;
        let received = crc::parse_hex(&self.checksum)?;
        let expected = crc::checksum(&self.payload);
        if received != expected {
            return Some(FrameEvent::CrcMismatch { expected, received });
        }
        Some(FrameEvent::Frame {
            command: &self.command,
            payload: &self.payload,
        })
    }
}

impl<const MAX_PAYLOAD: usize> Default for FrameParser<MAX_PAYLOAD> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::frame::encode_frame;

    type Parser = FrameParser<64>;

    /// Feed a byte slice, collecting owned copies of the produced events.
    fn feed(parser: &mut Parser, bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut frames = Vec::new();
        for &b in bytes {
            if let Some(FrameEvent::Frame { command, payload }) = parser.push(b) {
                frames.push((command.to_string(), payload.to_vec()));
            }
        }
        frames
    }

    #[test]
    fn parses_an_encoded_frame() {
        let mut out: heapless::Vec<u8, 64> = heapless::Vec::new();
        encode_frame("MVEL", &[1, 2, 3, 4, 5, 6], &mut out).unwrap();

        let mut parser = Parser::new();
        let frames = feed(&mut parser, &out);
        assert_eq!(frames, vec![("MVEL".to_string(), vec![1, 2, 3, 4, 5, 6])]);
    }

    #[test]
    fn parses_zero_length_payload() {
        let mut parser = Parser::new();
        let frames = feed(&mut parser, b"SPING0\n\nFFFF\n");
        assert_eq!(frames, vec![("SPING".to_string(), vec![])]);
    }

    #[test]
    fn payload_may_contain_terminator_bytes() {
        // Declared length wins over embedded '\n' bytes.
        let payload = b"a\nb\nc";
        let mut out: heapless::Vec<u8, 64> = heapless::Vec::new();
        encode_frame("DIMG", payload, &mut out).unwrap();

        let mut parser = Parser::new();
        let frames = feed(&mut parser, &out);
        assert_eq!(frames, vec![("DIMG".to_string(), payload.to_vec())]);
    }

    #[test]
    fn crc_mismatch_reports_both_values_and_drops_frame() {
        let mut parser = Parser::new();
        let mut events = Vec::new();
        for &b in b"SPING0\n\n1234\n".iter() {
            match parser.push(b) {
                Some(FrameEvent::CrcMismatch { expected, received }) => {
                    events.push((expected, received));
                }
                Some(FrameEvent::Frame { .. }) => panic!("corrupt frame must not complete"),
                None => {}
            }
        }
        assert_eq!(events, vec![(0xFFFF, 0x1234)]);
    }

    #[test]
    fn recovers_after_crc_mismatch() {
        let mut parser = Parser::new();
        feed(&mut parser, b"SPING0\n\n0000\n");
        let frames = feed(&mut parser, b"SPING0\n\nFFFF\n");
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn header_without_digits_is_silently_dropped() {
        let mut parser = Parser::new();
        let frames = feed(&mut parser, b"GARBAGE\nSPING0\n\nFFFF\n");
        assert_eq!(frames, vec![("SPING".to_string(), vec![])]);
    }

    #[test]
    fn header_with_no_name_is_dropped() {
        let mut parser = Parser::new();
        let frames = feed(&mut parser, b"15\nSPING0\n\nFFFF\n");
        assert_eq!(frames, vec![("SPING".to_string(), vec![])]);
    }

    #[test]
    fn interleaved_digits_in_name_are_dropped() {
        // Digits must be the trailing run: "SP1NG0" parses as name "SP",
        // digits "1NG0" — the non-digit 'N' invalidates the line.
        let mut parser = Parser::new();
        let frames = feed(&mut parser, b"SP1NG0\nSPING0\n\nFFFF\n");
        assert_eq!(frames, vec![("SPING".to_string(), vec![])]);
    }

    #[test]
    fn oversized_declared_length_is_dropped() {
        // 1000 > the 64-byte test capacity; the line is dropped and the
        // parser stays in sync for the next frame.
        let mut parser = Parser::new();
        let frames = feed(&mut parser, b"DIMG1000\nSPING0\n\nFFFF\n");
        assert_eq!(frames, vec![("SPING".to_string(), vec![])]);
    }

    #[test]
    fn oversized_header_line_is_dropped() {
        let mut parser = Parser::new();
        let mut noise = vec![b'X'; 100];
        noise.push(b'\n');
        noise.extend_from_slice(b"SPING0\n\nFFFF\n");
        let frames = feed(&mut parser, &noise);
        assert_eq!(frames, vec![("SPING".to_string(), vec![])]);
    }

    #[test]
    fn oversized_checksum_field_is_dropped() {
        let mut parser = Parser::new();
        let frames = feed(&mut parser, b"SPING0\n\nFFFFF\nSPING0\n\nFFFF\n");
        assert_eq!(frames, vec![("SPING".to_string(), vec![])]);
    }

    #[test]
    fn non_hex_checksum_is_dropped() {
        let mut parser = Parser::new();
        let frames = feed(&mut parser, b"SPING0\n\nZZZZ\nSPING0\n\nFFFF\n");
        assert_eq!(frames, vec![("SPING".to_string(), vec![])]);
    }

    #[test]
    fn short_payload_breaks_framing_and_resyncs() {
        // Declared 4 bytes but only 2 arrive before the terminators; the
        // parser consumes what it was promised and resynchronises on the
        // next line boundary without emitting a frame.
        let mut parser = Parser::new();
        let frames = feed(&mut parser, b"DIMG4\nab\nFFFF\nSPING0\n\nFFFF\n");
        assert_eq!(frames, vec![("SPING".to_string(), vec![])]);
    }

    #[test]
    fn back_to_back_frames_parse_independently() {
        let mut bytes = Vec::new();
        for _ in 0..3 {
            let mut out: heapless::Vec<u8, 64> = heapless::Vec::new();
            encode_frame("MSTOP", &[], &mut out).unwrap();
            bytes.extend_from_slice(&out);
        }
        let mut parser = Parser::new();
        let frames = feed(&mut parser, &bytes);
        assert_eq!(frames.len(), 3);
    }
}
