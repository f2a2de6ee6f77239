//! Device → host responses.
//!
//! Every accepted frame produces exactly one response:
//!
//! ```text
//! <STATUS><LEN>\n<LEN bytes of message>\n
//! ```
//!
//! CRC-rejected frames get an `ERR` response describing the mismatch;
//! malformed headers get nothing (indistinguishable from line noise).

use core::fmt::Write;

/// Upper bound on a response message, in bytes.
///
/// Generous for every message the device emits; formatting into a full
/// buffer truncates rather than failing.
pub const MAX_MESSAGE_LEN: usize = 96;

/// Encoded-response capacity: status + length digits + message + terminators.
pub const MAX_RESPONSE_LEN: usize = 128;

/// Response status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Command accepted and completed.
    Ok,
    /// Command rejected or failed.
    Err,
    /// Command accepted, completion pending.
    Pending,
}

impl Status {
    /// Wire spelling of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Err => "ERR",
            Self::Pending => "PENDING",
        }
    }
}

/// One response unit: status plus a bounded human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status field.
    pub status: Status,
    /// Diagnostic or echo message.
    pub message: heapless::String<MAX_MESSAGE_LEN>,
}

impl Response {
    /// Build an `OK` response from preformatted arguments.
    #[must_use]
    pub fn ok(args: core::fmt::Arguments<'_>) -> Self {
        Self::with_status(Status::Ok, args)
    }

    /// Build an `ERR` response from preformatted arguments.
    #[must_use]
    pub fn err(args: core::fmt::Arguments<'_>) -> Self {
        Self::with_status(Status::Err, args)
    }

    /// Build a response with an explicit status.
    ///
    /// A message longer than [`MAX_MESSAGE_LEN`] is truncated; responses are
    /// diagnostics, not data, so truncation beats failure here.
    #[must_use]
    pub fn with_status(status: Status, args: core::fmt::Arguments<'_>) -> Self {
        let mut message = heapless::String::new();
        let _ = message.write_fmt(args);
        Self { status, message }
    }

    /// Encode the response into its wire form.
    #[must_use]
    pub fn encode(&self) -> heapless::Vec<u8, MAX_RESPONSE_LEN> {
        let mut out = heapless::Vec::new();
        let mut header: heapless::String<16> = heapless::String::new();
        // Status (max 7) + length digits (max 2 for a 96-byte message) always
        // fit in 16 bytes; MAX_RESPONSE_LEN covers the whole encoding, so none
        // of these writes can fail.
        let _ = write!(header, "{}{}", self.status.as_str(), self.message.len());
        let _ = out.extend_from_slice(header.as_bytes());
        let _ = out.push(b'\n');
        let _ = out.extend_from_slice(self.message.as_bytes());
        let _ = out.push(b'\n');
        out
    }
}
