//! Wire protocol for the host ↔ peripheral-node serial link.
//!
//! Command frames travel host → device, responses device → host:
//!
//! ```text
//! command:  <NAME><LEN>\n<LEN bytes of payload>\n<4 hex-digit CRC>\n
//! response: <STATUS><LEN>\n<LEN bytes of message>\n
//! ```
//!
//! The CRC is CRC-CCITT (poly 0x1021, init 0xFFFF, MSB-first) over the
//! payload bytes only, rendered as four uppercase hex digits. It detects
//! transmission errors; it is not an authentication mechanism.
//!
//! # Modules
//!
//! - [`crc`] — checksum computation and hex rendering
//! - [`frame`] — command-frame encoding (host side, tests)
//! - [`parser`] — incremental per-byte frame parser (device side)
//! - [`response`] — status/message responses and their encoding
//! - [`command`] — the fixed command table and the MVEL payload codec
//!
//! All buffers are `heapless` and statically sized; the crate is `no_std`
//! and allocation-free.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod command;
pub mod crc;
pub mod frame;
pub mod parser;
pub mod response;

pub use command::{CommandKind, MotorVelocity};
pub use frame::{encode_frame, EncodeError, MAX_COMMAND_LEN};
pub use parser::{FrameEvent, FrameParser};
pub use response::{Response, Status, MAX_MESSAGE_LEN};
