//! The control loop: frame intake, dispatch and the safety ticks.
//!
//! One cooperative loop owns everything. Each [`Node::poll_once`] iteration:
//!
//! 1. drains every byte currently available on the link through the frame
//!    parser, dispatching each completed frame and writing its response;
//! 2. runs the motor auto-stop tick;
//! 3. runs the link watchdog, stopping the motors if the host has gone
//!    silent while they run.
//!
//! Dispatch is synchronous: a handler (including a multi-second display
//! refresh) runs to completion before the next byte is read, and during that
//! window the safety ticks are not serviced. That stall is the accepted cost
//! of the single-threaded model.
//!
//! Payload lengths are validated here, once, against the command table —
//! handlers never see a wrong-sized payload. Restart and halt write and
//! flush their response before acting so the host sees the `OK`.

use platform::{DisplayPanel, MonotonicClock, MotorOutputs, SerialLink, SystemControl};
use protocol::{CommandKind, FrameEvent, FrameParser, MotorVelocity, Response};

use crate::config::{IMAGE_BUFFER_SIZE, WATCHDOG_TIMEOUT_MS};
use crate::display::DisplayController;
use crate::motor::MotorController;
use crate::supervisor::{PostAction, Supervisor};

/// The peripheral-control node: link, clock, state machines and the parser,
/// wired together over the platform traits.
pub struct Node<L, C, M, P, S>
where
    L: SerialLink,
    C: MonotonicClock,
    M: MotorOutputs,
    P: DisplayPanel,
    S: SystemControl,
{
    link: L,
    clock: C,
    system: S,
    parser: FrameParser<IMAGE_BUFFER_SIZE>,
    motor: MotorController<M>,
    display: DisplayController<P>,
    supervisor: Supervisor,
}

impl<L, C, M, P, S> Node<L, C, M, P, S>
where
    L: SerialLink,
    C: MonotonicClock,
    M: MotorOutputs,
    P: DisplayPanel,
    S: SystemControl,
{
    /// Assemble a node. The watchdog arms immediately.
    pub fn new(link: L, clock: C, motors: M, panel: P, system: S) -> Self {
        let now = clock.now_ms();
        Self {
            link,
            clock,
            system,
            parser: FrameParser::new(),
            motor: MotorController::new(motors),
            display: DisplayController::new(panel),
            supervisor: Supervisor::new(WATCHDOG_TIMEOUT_MS, now),
        }
    }

    /// The serial link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutable link access (tests feed received bytes through this).
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// The motor state machine.
    pub fn motor(&self) -> &MotorController<M> {
        &self.motor
    }

    /// The display controller.
    pub fn display(&self) -> &DisplayController<P> {
        &self.display
    }

    /// The system-control backend.
    pub fn system(&self) -> &S {
        &self.system
    }

    /// Run one loop iteration. Returns on link errors only; per-frame
    /// protocol errors are answered on the wire and never propagate.
    pub fn poll_once(&mut self) -> Result<(), L::Error> {
        let Self {
            link,
            clock,
            system,
            parser,
            motor,
            display,
            supervisor,
        } = self;

        while let Some(byte) = link.read_byte()? {
            let Some(event) = parser.push(byte) else {
                continue;
            };
            let now = clock.now_ms();
            let (response, action) = match event {
                FrameEvent::CrcMismatch { expected, received } => (
                    Response::err(format_args!(
                        "crc mismatch: expected {expected:04X}, got {received:04X}"
                    )),
                    None,
                ),
                FrameEvent::Frame { command, payload } => {
                    supervisor.note_frame(now);
                    dispatch(command, payload, now, motor, display)
                }
            };
            link.write_all(&response.encode())?;
            if let Some(action) = action {
                // The host must see the response before the device goes away.
                link.flush()?;
                match action {
                    PostAction::Restart => system.restart(),
                    PostAction::Halt => system.deep_sleep(),
                }
            }
        }

        let now = clock.now_ms();
        let timed_out = motor.check_timeout(now);
        #[cfg(feature = "defmt")]
        if timed_out {
            defmt::info!("motor auto-stop deadline reached");
        }
        let _ = timed_out;
        if supervisor.link_lost(now) && motor.is_running() {
            #[cfg(feature = "defmt")]
            defmt::warn!("link watchdog expired, stopping motors");
            // No frame to answer; a channel-write fault stays local.
            let _ = motor.force_stop();
        }
        Ok(())
    }
}

/// Route one CRC-valid frame to its handler.
///
/// Unknown names and wrong payload lengths are rejected here so the state
/// machines only ever see well-formed commands.
fn dispatch<M: MotorOutputs, P: DisplayPanel>(
    name: &str,
    payload: &[u8],
    now_ms: u64,
    motor: &mut MotorController<M>,
    display: &mut DisplayController<P>,
) -> (Response, Option<PostAction>) {
    let Some(kind) = CommandKind::from_name(name) else {
        return (
            Response::err(format_args!("unknown command: {name}")),
            None,
        );
    };

    let expected = kind.expected_payload_len(IMAGE_BUFFER_SIZE);
    if payload.len() != expected {
        return (
            Response::err(format_args!(
                "{} expects {expected} bytes, got {}",
                kind.name(),
                payload.len()
            )),
            None,
        );
    }

    match kind {
        CommandKind::Mvel => match MotorVelocity::decode(payload) {
            Some(v) => (motor.handle_velocity(v, now_ms), None),
            // Unreachable after the length check, but never panic on input.
            None => (Response::err(format_args!("malformed MVEL payload")), None),
        },
        CommandKind::Mstop => (motor.handle_stop(), None),
        CommandKind::Dimg => (display.handle_image(payload), None),
        CommandKind::Dclear => (display.handle_clear(), None),
        CommandKind::Dstatus => (display.handle_status(), None),
        CommandKind::Sping => (Response::ok(format_args!("PONG")), None),
        CommandKind::Sreset => {
            display.reset_buffer();
            match motor.force_stop() {
                Ok(()) => (
                    Response::ok(format_args!("restarting")),
                    Some(PostAction::Restart),
                ),
                Err(err) => (Response::err(format_args!("motor fault: {err:?}")), None),
            }
        }
        CommandKind::Shalt => match motor.force_stop() {
            Ok(()) => (
                Response::ok(format_args!("halting")),
                Some(PostAction::Halt),
            ),
            Err(err) => (Response::err(format_args!("motor fault: {err:?}")), None),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::{MockClock, MockLink, MockMotors, MockPanel, MockSystem};

    type TestNode<'a> = Node<MockLink, &'a MockClock, MockMotors, MockPanel, MockSystem>;

    fn node(clock: &MockClock) -> TestNode<'_> {
        Node::new(
            MockLink::new(),
            clock,
            MockMotors::new(),
            MockPanel::new(IMAGE_BUFFER_SIZE),
            MockSystem::new(),
        )
    }

    fn send(node: &mut TestNode<'_>, command: &str, payload: &[u8]) {
        let mut frame: heapless::Vec<u8, 16_384> = heapless::Vec::new();
        protocol::encode_frame(command, payload, &mut frame).unwrap();
        node.link_mut().feed(&frame);
        node.poll_once().unwrap();
    }

    #[test]
    fn ping_answers_pong() {
        let clock = MockClock::new();
        let mut n = node(&clock);
        send(&mut n, "SPING", &[]);
        assert_eq!(n.link().transmitted(), b"OK4\nPONG\n");
    }

    #[test]
    fn unknown_command_is_named_in_the_error() {
        let clock = MockClock::new();
        let mut n = node(&clock);
        send(&mut n, "FOO", &[]);
        assert_eq!(n.link().transmitted(), b"ERR20\nunknown command: FOO\n");
    }

    #[test]
    fn length_mismatch_names_both_sizes() {
        let clock = MockClock::new();
        let mut n = node(&clock);
        send(&mut n, "MVEL", &[1, 2, 3]);
        assert_eq!(
            n.link().transmitted(),
            b"ERR27\nMVEL expects 6 bytes, got 3\n"
        );
        assert!(!n.motor().is_running());
    }

    #[test]
    fn restart_responds_flushes_then_resets() {
        let clock = MockClock::new();
        let mut n = node(&clock);
        send(&mut n, "SRESET", &[]);
        assert_eq!(n.link().transmitted(), b"OK10\nrestarting\n");
        assert_eq!(n.link().flush_count(), 1);
        assert_eq!(n.system().restart_count(), 1);
        assert_eq!(n.system().sleep_count(), 0);
    }

    #[test]
    fn halt_stops_motors_and_sleeps() {
        let clock = MockClock::new();
        let mut n = node(&clock);
        send(&mut n, "MVEL", &MotorVelocity {
            left: 100,
            right: 100,
            duration_ms: 0,
        }
        .encode());
        assert!(n.motor().is_running());

        send(&mut n, "SHALT", &[]);
        assert!(!n.motor().is_running());
        assert!(n.motor().outputs().is_stopped());
        assert_eq!(n.system().sleep_count(), 1);
    }
}
