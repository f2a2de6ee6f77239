//! Peripheral-control node firmware.
//!
//! The device end of a two-node robot controller: it receives framed
//! commands from the host over a serial link and drives the differential
//! motors, the bistable e-paper panel and device power.
//!
//! # Architecture
//!
//! ```text
//! Host ──serial──▶ FrameParser ──▶ dispatch ──▶ MotorController
//!                  (protocol)       (node)       DisplayController
//!                                                Supervisor / SystemControl
//! ```
//!
//! Everything runs on one cooperative loop ([`Node::poll_once`]): drain input
//! bytes, dispatch completed frames, then the motor auto-stop tick and the
//! link watchdog. Hardware is reached only through the `platform` traits, so
//! every state machine runs unmodified in host tests against mocks.
//!
//! # Command set
//!
//! | Command | Payload | Effect |
//! |---------|---------|--------|
//! | `MVEL`  | 6 bytes | set wheel velocities, optional auto-stop |
//! | `MSTOP` | none    | immediate stop |
//! | `DIMG`  | 15 000 bytes | replace and show the image |
//! | `DCLEAR`| none    | blank and show |
//! | `DSTATUS`| none   | report buffer state |
//! | `SRESET`| none    | stop, clear, restart |
//! | `SHALT` | none    | stop, deep sleep |
//! | `SPING` | none    | liveness probe |

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

#[cfg(feature = "defmt-logging")]
use defmt_rtt as _;

pub mod config;
pub mod display;
pub mod motor;
pub mod node;
pub mod supervisor;

pub use display::{DisplayController, FillState, PanelError, Ssd1683};
pub use motor::{MotorController, RunState};
pub use node::Node;
pub use supervisor::{PostAction, Supervisor};
