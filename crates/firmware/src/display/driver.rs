//! SSD1683 Hardware Driver
//!
//! Blocking driver for the SSD1683 e-ink controller behind the 4.2"
//! 400×300 bistable panel.
//!
//! # Wiring
//!
//! | Signal | Direction      | Notes                         |
//! |--------|----------------|-------------------------------|
//! | SCK    | Host → Display |                               |
//! | MOSI   | Host → Display |                               |
//! | CS     | Host → Display | managed by `SpiDevice`        |
//! | DC     | Host → Display | low = command, high = data    |
//! | RST    | Host → Display | active low                    |
//! | BUSY   | Display → Host | HIGH while the controller works |
//!
//! # Show sequence
//!
//! The panel is driven cold-to-cold on every refresh: hardware reset,
//! software reset, controller init, stream the frame into B/W RAM, trigger
//! a full update, wait for BUSY to release, then deep sleep. The refresh
//! wait is on the order of seconds; BUSY polling is bounded so a dead panel
//! surfaces as [`PanelError::BusyTimeout`] instead of hanging the device.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;
use thiserror_no_std::Error;

use platform::DisplayPanel;

use crate::config::IMAGE_BUFFER_SIZE;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// BUSY poll interval in milliseconds.
const BUSY_POLL_MS: u32 = 100;

/// BUSY poll attempts before giving up: 300 × 100 ms = 30 s, several times
/// the worst observed full-refresh time.
const MAX_BUSY_POLLS: u32 = 300;

/// `DisplayUpdateCtrl2` flag for a full refresh via the OTP waveform.
const UPDATE_FULL: u8 = 0xF7;

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

/// SSD1683 command codes.
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
pub enum Command {
    /// Deep sleep — 1 data byte (0x01 = preserve RAM).
    DeepSleep = 0x10,
    /// Data entry mode — 1 data byte.
    DataEntryMode = 0x11,
    /// Software reset — 0 data bytes; poll BUSY after.
    SoftReset = 0x12,
    /// Master activation — 0 data bytes; triggers the panel update.
    MasterActivation = 0x20,
    /// Display update control 1 — 2 data bytes (RAM routing).
    DisplayUpdateCtrl1 = 0x21,
    /// Display update control 2 — 1 data byte (sequence flags).
    DisplayUpdateCtrl2 = 0x22,
    /// Write RAM (B/W) — pixel data, 1bpp MSB-first.
    WriteRamBw = 0x24,
    /// Border waveform control — 1 data byte.
    BorderWaveform = 0x3C,
    /// Set RAM X start/end address — 2 data bytes (byte units).
    SetRamXRange = 0x44,
    /// Set RAM Y start/end address — 4 data bytes.
    SetRamYRange = 0x45,
    /// Set RAM X address counter — 1 data byte.
    SetRamXCounter = 0x4E,
    /// Set RAM Y address counter — 2 data bytes.
    SetRamYCounter = 0x4F,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors returned by the SSD1683 driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError {
    /// SPI transfer failed.
    #[error("spi transfer failed")]
    Spi,
    /// A control pin could not be driven or read.
    #[error("control pin unresponsive")]
    Gpio,
    /// BUSY stayed high past the poll budget.
    #[error("busy line never released")]
    BusyTimeout,
    /// Caller supplied a frame with the wrong number of bytes.
    #[error("frame is {got} bytes, panel takes {expected}")]
    InvalidFrameLen {
        /// Bytes the panel RAM holds.
        expected: usize,
        /// Bytes the caller supplied.
        got: usize,
    },
}

// ---------------------------------------------------------------------------
// Driver struct
// ---------------------------------------------------------------------------

/// SSD1683 display driver.
///
/// Generic over:
/// - `SPI` — a blocking [`embedded_hal::spi::SpiDevice`] (manages CS).
/// - `DC`  — Data/Command [`OutputPin`].
/// - `RST` — Reset [`OutputPin`].
/// - `BUSY`— Busy [`InputPin`] (HIGH when busy).
/// - `DELAY` — [`DelayNs`] for reset and poll timing.
///
/// In host tests supply the `embedded_hal_mock::eh1` mocks.
pub struct Ssd1683<SPI, DC, RST, BUSY, DELAY> {
    spi: SPI,
    dc: DC,
    rst: RST,
    busy: BUSY,
    delay: DELAY,
}

impl<SPI, DC, RST, BUSY, DELAY> Ssd1683<SPI, DC, RST, BUSY, DELAY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    DELAY: DelayNs,
{
    /// Create a new driver instance. Touches no hardware.
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY, delay: DELAY) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            delay,
        }
    }

    // -----------------------------------------------------------------------
    // Low-level SPI helpers
    // -----------------------------------------------------------------------

    /// Assert DC low (command mode) and send one command byte.
    fn send_command(&mut self, cmd: Command) -> Result<(), PanelError> {
        self.dc.set_low().map_err(|_| PanelError::Gpio)?;
        self.spi.write(&[cmd as u8]).map_err(|_| PanelError::Spi)
    }

    /// Assert DC high (data mode) and send bytes.
    fn send_data(&mut self, data: &[u8]) -> Result<(), PanelError> {
        if data.is_empty() {
            return Ok(());
        }
        self.dc.set_high().map_err(|_| PanelError::Gpio)?;
        self.spi.write(data).map_err(|_| PanelError::Spi)
    }

    /// Send one command followed immediately by its data bytes.
    fn cmd_data(&mut self, cmd: Command, data: &[u8]) -> Result<(), PanelError> {
        self.send_command(cmd)?;
        self.send_data(data)
    }

    // -----------------------------------------------------------------------
    // BUSY polling
    // -----------------------------------------------------------------------

    /// Block until BUSY goes LOW (controller idle) or the budget runs out.
    ///
    /// BUSY is active HIGH on the SSD1683. Poll every [`BUSY_POLL_MS`]; after
    /// [`MAX_BUSY_POLLS`] attempts return [`PanelError::BusyTimeout`].
    fn wait_idle(&mut self) -> Result<(), PanelError> {
        for _ in 0..MAX_BUSY_POLLS {
            if self.busy.is_low().map_err(|_| PanelError::Gpio)? {
                return Ok(());
            }
            self.delay.delay_ms(BUSY_POLL_MS);
        }
        Err(PanelError::BusyTimeout)
    }

    // -----------------------------------------------------------------------
    // Reset
    // -----------------------------------------------------------------------

    /// Hardware reset sequence: RST HIGH 200 ms → LOW 2 ms → HIGH 200 ms.
    fn hardware_reset(&mut self) -> Result<(), PanelError> {
        self.rst.set_high().map_err(|_| PanelError::Gpio)?;
        self.delay.delay_ms(200);
        self.rst.set_low().map_err(|_| PanelError::Gpio)?;
        self.delay.delay_ms(2);
        self.rst.set_high().map_err(|_| PanelError::Gpio)?;
        self.delay.delay_ms(200);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Controller init
    // -----------------------------------------------------------------------

    /// Initialisation after reset: RAM routing, border, data entry mode and
    /// a full-screen RAM window with counters at the origin.
    fn init(&mut self) -> Result<(), PanelError> {
        // B/W only: bypass the red RAM.
        self.cmd_data(Command::DisplayUpdateCtrl1, &[0x40, 0x00])?;
        self.cmd_data(Command::BorderWaveform, &[0x05])?;
        // X+, Y+ scan order.
        self.cmd_data(Command::DataEntryMode, &[0x03])?;
        // X window: bytes 0..=49 (400 px / 8).
        self.cmd_data(Command::SetRamXRange, &[0x00, 0x31])?;
        // Y window: rows 0..=299 (0x012B).
        self.cmd_data(Command::SetRamYRange, &[0x00, 0x00, 0x2B, 0x01])?;
        self.cmd_data(Command::SetRamXCounter, &[0x00])?;
        self.cmd_data(Command::SetRamYCounter, &[0x00, 0x00])
    }

    /// Full update via the OTP waveform, then wait for BUSY to release.
    fn refresh(&mut self) -> Result<(), PanelError> {
        self.cmd_data(Command::DisplayUpdateCtrl2, &[UPDATE_FULL])?;
        self.send_command(Command::MasterActivation)?;
        self.wait_idle()
    }

    /// Enter deep sleep (preserves RAM, ~1 µA).
    fn sleep(&mut self) -> Result<(), PanelError> {
        self.cmd_data(Command::DeepSleep, &[0x01])?;
        self.delay.delay_ms(100);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// platform::DisplayPanel implementation
// ---------------------------------------------------------------------------

impl<SPI, DC, RST, BUSY, DELAY> DisplayPanel for Ssd1683<SPI, DC, RST, BUSY, DELAY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    DELAY: DelayNs,
{
    type Error = PanelError;

    fn frame_len(&self) -> usize {
        IMAGE_BUFFER_SIZE
    }

    /// Run the complete show sequence with `frame` as the new image.
    ///
    /// `frame` must be exactly [`IMAGE_BUFFER_SIZE`] bytes packed 1bpp,
    /// 8 pixels per byte MSB-first, 1 = white.
    fn show(&mut self, frame: &[u8]) -> Result<(), PanelError> {
        if frame.len() != IMAGE_BUFFER_SIZE {
            return Err(PanelError::InvalidFrameLen {
                expected: IMAGE_BUFFER_SIZE,
                got: frame.len(),
            });
        }
        self.hardware_reset()?;
        self.wait_idle()?;
        self.send_command(Command::SoftReset)?;
        self.wait_idle()?;
        self.init()?;
        self.send_command(Command::WriteRamBw)?;
        self.send_data(frame)?;
        self.refresh()?;
        self.sleep()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
