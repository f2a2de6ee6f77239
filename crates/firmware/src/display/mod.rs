//! Display buffer and refresh control.
//!
//! Owns the single packed 1-bit image buffer and decides when it goes to
//! glass. The buffer lifecycle is explicit:
//!
//! ```text
//! Empty ──(chunk)──▶ Filling ──(cursor = capacity)──▶ Ready
//! Empty ──(full image)──▶ Ready
//! any   ──(clear/reset)──▶ Empty
//! ```
//!
//! A refresh hands the whole buffer to the [`DisplayPanel`] and blocks until
//! the panel sleeps again; the loop accepts that stall (see the node docs).

pub mod driver;

pub use driver::{PanelError, Ssd1683};

use platform::DisplayPanel;
use protocol::Response;

use crate::config::{BLANK_BYTE, IMAGE_BUFFER_SIZE};

/// Buffer readiness. `Filling` only occurs during chunked uploads; a
/// single-frame image write goes straight to `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FillState {
    /// Blank since boot or the last clear.
    Empty,
    /// Partially filled by chunked receives.
    Filling,
    /// Holds a complete image.
    Ready,
}

impl FillState {
    fn label(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Filling => "filling",
            Self::Ready => "ready",
        }
    }
}

/// Image buffer plus the panel that shows it.
pub struct DisplayController<P: DisplayPanel> {
    panel: P,
    buffer: [u8; IMAGE_BUFFER_SIZE],
    cursor: usize,
    state: FillState,
}

impl<P: DisplayPanel> DisplayController<P> {
    /// Blank buffer, nothing shown yet.
    pub fn new(panel: P) -> Self {
        // The buffer lives wherever the controller does; on hardware that is
        // a static, so the array size is expected.
        #[allow(clippy::large_stack_arrays)]
        Self {
            panel,
            buffer: [BLANK_BYTE; IMAGE_BUFFER_SIZE],
            cursor: 0,
            state: FillState::Empty,
        }
    }

    /// Buffer readiness.
    #[must_use]
    pub fn fill_state(&self) -> FillState {
        self.state
    }

    /// Bytes written since the last clear.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The wrapped panel.
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Replace the buffer with a complete image and show it.
    ///
    /// The dispatcher has already validated the length; the check here keeps
    /// the controller safe on its own and leaves the buffer untouched on a
    /// wrong-sized payload.
    pub fn handle_image(&mut self, payload: &[u8]) -> Response {
        if payload.len() != IMAGE_BUFFER_SIZE {
            return Response::err(format_args!(
                "DIMG expects {IMAGE_BUFFER_SIZE} bytes, got {}",
                payload.len()
            ));
        }
        self.buffer.copy_from_slice(payload);
        self.cursor = IMAGE_BUFFER_SIZE;
        self.state = FillState::Ready;

        if let Err(err) = self.panel.show(&self.buffer) {
            // The buffer itself is intact; only the refresh failed.
            return Response::err(format_args!("panel fault: {err}"));
        }
        Response::ok(format_args!("displayed {IMAGE_BUFFER_SIZE} bytes"))
    }

    /// Blank the buffer and show the blank frame.
    pub fn handle_clear(&mut self) -> Response {
        self.reset_buffer();
        if let Err(err) = self.panel.show(&self.buffer) {
            return Response::err(format_args!("panel fault: {err}"));
        }
        Response::ok(format_args!("cleared"))
    }

    /// Report fill level and readiness. Touches no hardware.
    pub fn handle_status(&self) -> Response {
        Response::ok(format_args!(
            "{}/{IMAGE_BUFFER_SIZE} {}",
            self.cursor,
            self.state.label()
        ))
    }

    /// Append a chunk of image data at the fill cursor.
    ///
    /// Returns the number of bytes accepted; anything past capacity is
    /// discarded. The buffer becomes [`FillState::Ready`] when the cursor
    /// reaches capacity. Used by chunked uploads that cannot frame the whole
    /// image at once.
    pub fn receive_chunk(&mut self, chunk: &[u8]) -> usize {
        let room = IMAGE_BUFFER_SIZE.saturating_sub(self.cursor);
        let take = chunk.len().min(room);
        let end = self.cursor.saturating_add(take);
        if let (Some(dst), Some(src)) = (self.buffer.get_mut(self.cursor..end), chunk.get(..take))
        {
            dst.copy_from_slice(src);
        }
        self.cursor = end;
        self.state = if self.cursor == IMAGE_BUFFER_SIZE {
            FillState::Ready
        } else if self.cursor > 0 {
            FillState::Filling
        } else {
            self.state
        };
        take
    }

    /// Blank the buffer without refreshing the panel.
    ///
    /// The restart path uses this: the panel keeps its last image (bistable)
    /// but the device reboots with a defined buffer.
    pub fn reset_buffer(&mut self) {
        self.buffer.fill(BLANK_BYTE);
        self.cursor = 0;
        self.state = FillState::Empty;
    }
}
