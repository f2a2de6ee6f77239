//! Motor velocity state machine.
//!
//! Owns the differential-drive outputs and the run/stop lifecycle:
//!
//! ```text
//! Idle ──(velocity, duration > 0)──▶ Timed ──(deadline)──▶ Idle
//! Idle ──(velocity, duration = 0)──▶ Indefinite
//! any  ──(stop)──▶ Idle
//! ```
//!
//! Speeds are clamped to the PWM duty range before they touch hardware.
//! A timed run carries an absolute deadline; [`MotorController::check_timeout`]
//! must be called every loop iteration so a host that goes silent after a
//! timed command cannot leave the wheels spinning. Indefinite runs are ended
//! only by an explicit stop or the link watchdog.

use platform::{Direction, MotorOutputs, Side};
use protocol::{MotorVelocity, Response};

/// Motion lifecycle. Timed runs carry their absolute stop deadline so a
/// stale flag/timestamp pair cannot disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    /// Both channels de-energised.
    Idle,
    /// Running with an auto-stop deadline.
    Timed {
        /// Monotonic time at which the tick forces a stop.
        deadline_ms: u64,
    },
    /// Running until explicitly stopped.
    Indefinite,
}

/// Velocity state machine over a pair of [`MotorOutputs`] channels.
pub struct MotorController<M: MotorOutputs> {
    outputs: M,
    state: RunState,
}

impl<M: MotorOutputs> MotorController<M> {
    /// Wrap the outputs, starting idle.
    ///
    /// Does not touch the hardware; the channels are assumed de-energised
    /// at boot (the drivers power up with duty 0).
    pub fn new(outputs: M) -> Self {
        Self {
            outputs,
            state: RunState::Idle,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// `true` unless idle.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state != RunState::Idle
    }

    /// The wrapped outputs.
    pub fn outputs(&self) -> &M {
        &self.outputs
    }

    /// Apply a velocity command.
    ///
    /// Speeds are clamped to `[-255, 255]`; `duration_ms == 0` selects an
    /// indefinite run; a zero velocity on both sides is just a stop. The OK
    /// response echoes the values actually applied.
    pub fn handle_velocity(&mut self, velocity: MotorVelocity, now_ms: u64) -> Response {
        let v = velocity.clamped();
        if let Err(err) = self.apply(v.left, v.right) {
            self.state = RunState::Idle;
            return Response::err(format_args!("motor fault: {err:?}"));
        }
        self.state = if v.left == 0 && v.right == 0 {
            RunState::Idle
        } else if v.duration_ms == 0 {
            RunState::Indefinite
        } else {
            RunState::Timed {
                deadline_ms: now_ms.saturating_add(u64::from(v.duration_ms)),
            }
        };
        Response::ok(format_args!("L={} R={} T={}", v.left, v.right, v.duration_ms))
    }

    /// Handle an explicit stop command. Idempotent.
    pub fn handle_stop(&mut self) -> Response {
        match self.force_stop() {
            Ok(()) => Response::ok(format_args!("stopped")),
            Err(err) => Response::err(format_args!("motor fault: {err:?}")),
        }
    }

    /// Zero both duties and return to [`RunState::Idle`].
    ///
    /// The state clears even if a channel write fails, so a faulted driver
    /// cannot leave a phantom run pending.
    pub fn force_stop(&mut self) -> Result<(), M::Error> {
        self.state = RunState::Idle;
        self.outputs.set_channel(Side::Left, Direction::Forward, 0)?;
        self.outputs.set_channel(Side::Right, Direction::Forward, 0)?;
        Ok(())
    }

    /// Safety tick: stop if a timed run has reached its deadline.
    ///
    /// Returns `true` when a stop was performed. Runs with no deadline are
    /// left alone. There is no host frame to answer here, so a channel-write
    /// fault cannot be reported; the state still clears.
    pub fn check_timeout(&mut self, now_ms: u64) -> bool {
        if let RunState::Timed { deadline_ms } = self.state {
            if now_ms >= deadline_ms {
                let _ = self.force_stop();
                return true;
            }
        }
        false
    }

    fn apply(&mut self, left: i16, right: i16) -> Result<(), M::Error> {
        self.outputs
            .set_channel(Side::Left, direction_of(left), duty_of(left))?;
        self.outputs
            .set_channel(Side::Right, direction_of(right), duty_of(right))
    }
}

fn direction_of(speed: i16) -> Direction {
    if speed < 0 {
        Direction::Reverse
    } else {
        Direction::Forward
    }
}

/// Magnitude of an already-clamped speed as a PWM duty.
fn duty_of(speed: i16) -> u8 {
    u8::try_from(speed.unsigned_abs()).unwrap_or(u8::MAX)
}
