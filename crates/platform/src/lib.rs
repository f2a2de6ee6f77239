//! Hardware Abstraction Layer (HAL) for the peripheral-control node.
//!
//! This crate provides trait-based abstractions for every piece of hardware
//! the control core touches, enabling development and testing without a
//! physical board.
//!
//! # Architecture Layers
//!
//! ```text
//! Control core (firmware crate: dispatcher, state machines, poll loop)
//!         ↓
//! Platform HAL (this crate — trait abstractions)
//!         ↓
//! Hardware Layer (board crate binding embedded-hal impls to real pins)
//! ```
//!
//! # Abstractions
//!
//! - [`SerialLink`] — byte-stream link to the host (UART)
//! - [`MonotonicClock`] — millisecond monotonic time source
//! - [`MotorOutputs`] — per-side direction pins + PWM duty
//! - [`DisplayPanel`] — bistable panel: full show sequence behind one call
//! - [`SystemControl`] — device restart and deep-sleep primitives
//!
//! # Features
//!
//! - `std`: expose the [`mocks`] module to downstream test code
//! - `hardware`: physical hardware target marker
//! - `defmt`: enable defmt logging derives

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

// The mocks use growable buffers; everything else is alloc-free.
#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod clock;
pub mod display;
pub mod link;
pub mod mocks;
pub mod motor;
pub mod system;

pub use clock::MonotonicClock;
pub use display::DisplayPanel;
pub use link::SerialLink;
pub use motor::{Direction, MotorOutputs, Side};
pub use system::SystemControl;
