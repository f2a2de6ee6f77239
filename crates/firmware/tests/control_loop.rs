//! End-to-end loop tests: encoded frames in, wire responses and hardware
//! side effects out, everything over the platform mocks.

#![allow(clippy::unwrap_used)]

use firmware::config::IMAGE_BUFFER_SIZE;
use firmware::{FillState, Node, RunState};
use platform::mocks::{MockClock, MockLink, MockMotors, MockPanel, MockSystem};
use platform::{Direction, Side};
use protocol::{encode_frame, MotorVelocity};

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

/// Encode one command frame as the host would put it on the wire.
fn frame(command: &str, payload: &[u8]) -> heapless::Vec<u8, 16_384> {
    let mut out = heapless::Vec::new();
    encode_frame(command, payload, &mut out).unwrap();
    out
}

fn mvel(left: i16, right: i16, duration_ms: u16) -> [u8; 6] {
    MotorVelocity {
        left,
        right,
        duration_ms,
    }
    .encode()
}

#[test]
fn velocity_is_clamped_applied_and_auto_stopped() {
    let clock = MockClock::new();
    let mut n = node(&clock);

    n.link_mut().feed(&frame("MVEL", &mvel(-300, 300, 1000)));
    n.poll_once().unwrap();

    assert_eq!(n.link_mut().take_transmitted().as_slice(), b"OK19\nL=-255 R=255 T=1000\n");
    assert_eq!(
        n.motor().outputs().channel(Side::Left),
        (Direction::Reverse, 255)
    );
    assert_eq!(
        n.motor().outputs().channel(Side::Right),
        (Direction::Forward, 255)
    );
    assert_eq!(n.motor().state(), RunState::Timed { deadline_ms: 1000 });

    // Just short of the deadline: still running.
    clock.advance(999);
    n.poll_once().unwrap();
    assert!(n.motor().is_running());

    // Deadline reached with no further frames: duty drops to zero.
    clock.advance(1);
    n.poll_once().unwrap();
    assert_eq!(n.motor().state(), RunState::Idle);
    assert!(n.motor().outputs().is_stopped());
}

#[test]
fn indefinite_run_only_stops_on_command() {
    let clock = MockClock::new();
    let mut n = node(&clock);

    n.link_mut().feed(&frame("MVEL", &mvel(100, 100, 0)));
    n.poll_once().unwrap();
    assert_eq!(n.motor().state(), RunState::Indefinite);

    // Ticks alone never stop it (stay inside the watchdog window).
    for _ in 0..4 {
        clock.advance(1000);
        n.poll_once().unwrap();
        n.link_mut().feed(&frame("SPING", &[]));
        n.poll_once().unwrap();
    }
    assert!(n.motor().is_running());

    n.link_mut().take_transmitted();
    n.link_mut().feed(&frame("MSTOP", &[]));
    n.poll_once().unwrap();
    assert_eq!(n.link_mut().take_transmitted().as_slice(), b"OK7\nstopped\n");
    assert!(n.motor().outputs().is_stopped());
}

#[test]
fn stop_is_idempotent_on_the_wire() {
    let clock = MockClock::new();
    let mut n = node(&clock);

    n.link_mut().feed(&frame("MSTOP", &[]));
    n.link_mut().feed(&frame("MSTOP", &[]));
    n.poll_once().unwrap();

    assert_eq!(
        n.link_mut().take_transmitted().as_slice(),
        b"OK7\nstopped\nOK7\nstopped\n"
    );
    assert_eq!(n.motor().state(), RunState::Idle);
}

#[test]
fn corrupted_frame_is_rejected_without_side_effects() {
    let clock = MockClock::new();
    let mut n = node(&clock);

    let mut bad = frame("MVEL", &mvel(100, 100, 0));
    // Flip one payload byte; the checksum no longer matches.
    *bad.get_mut(6).unwrap() ^= 0x01;
    n.link_mut().feed(&bad);
    n.poll_once().unwrap();

    let sent = n.link_mut().take_transmitted();
    assert!(sent.starts_with(b"ERR"));
    assert!(
        sent.windows(12).any(|w| w == b"crc mismatch"),
        "diagnostic must cite the checksum"
    );
    // The handler never ran.
    assert_eq!(n.motor().state(), RunState::Idle);
    assert!(n.motor().outputs().history().is_empty());

    // The next well-formed frame parses normally.
    n.link_mut().feed(&frame("SPING", &[]));
    n.poll_once().unwrap();
    assert_eq!(n.link_mut().take_transmitted().as_slice(), b"OK4\nPONG\n");
}

#[test]
fn image_round_trip_reaches_the_panel() {
    let clock = MockClock::new();
    let mut n = node(&clock);

    let mut image = vec![0u8; IMAGE_BUFFER_SIZE];
    for (i, b) in image.iter_mut().enumerate() {
        *b = u8::try_from(i % 251).unwrap();
    }
    n.link_mut().feed(&frame("DIMG", &image));
    n.poll_once().unwrap();

    assert_eq!(
        n.link_mut().take_transmitted().as_slice(),
        b"OK21\ndisplayed 15000 bytes\n"
    );
    assert_eq!(n.display().panel().show_count(), 1);
    assert_eq!(n.display().panel().last_frame(), image.as_slice());
    assert_eq!(n.display().fill_state(), FillState::Ready);

    n.link_mut().feed(&frame("DSTATUS", &[]));
    n.poll_once().unwrap();
    assert_eq!(
        n.link_mut().take_transmitted().as_slice(),
        b"OK17\n15000/15000 ready\n"
    );
}

#[test]
fn undersized_image_is_rejected_and_buffer_untouched() {
    let clock = MockClock::new();
    let mut n = node(&clock);

    n.link_mut().feed(&frame("DIMG", &[0xAAu8; 64]));
    n.poll_once().unwrap();

    assert_eq!(
        n.link_mut().take_transmitted().as_slice(),
        b"ERR32\nDIMG expects 15000 bytes, got 64\n"
    );
    assert_eq!(n.display().panel().show_count(), 0);
    assert_eq!(n.display().fill_state(), FillState::Empty);
}

#[test]
fn clear_shows_a_blank_frame() {
    let clock = MockClock::new();
    let mut n = node(&clock);

    n.link_mut().feed(&frame("DCLEAR", &[]));
    n.poll_once().unwrap();

    assert_eq!(n.link_mut().take_transmitted().as_slice(), b"OK7\ncleared\n");
    assert_eq!(n.display().panel().show_count(), 1);
    assert!(n.display().panel().last_frame().iter().all(|&b| b == 0xFF));
}

#[test]
fn watchdog_stops_motors_when_the_host_goes_silent() {
    let clock = MockClock::new();
    let mut n = node(&clock);

    n.link_mut().feed(&frame("MVEL", &mvel(80, 80, 0)));
    n.poll_once().unwrap();
    assert!(n.motor().is_running());

    // Silence up to the threshold is tolerated.
    clock.advance(5_000);
    n.poll_once().unwrap();
    assert!(n.motor().is_running());

    // One tick past it the motors stop.
    clock.advance(1);
    n.poll_once().unwrap();
    assert_eq!(n.motor().state(), RunState::Idle);
    assert!(n.motor().outputs().is_stopped());
}

#[test]
fn any_valid_frame_rearms_the_watchdog() {
    let clock = MockClock::new();
    let mut n = node(&clock);

    n.link_mut().feed(&frame("MVEL", &mvel(80, 80, 0)));
    n.poll_once().unwrap();

    // A liveness probe at t=4s pushes the silence window out.
    clock.advance(4_000);
    n.link_mut().feed(&frame("SPING", &[]));
    n.poll_once().unwrap();

    clock.advance(5_000);
    n.poll_once().unwrap();
    assert!(n.motor().is_running());

    clock.advance(1);
    n.poll_once().unwrap();
    assert!(!n.motor().is_running());
}

#[test]
fn restart_clears_the_buffer_and_resets_after_responding() {
    let clock = MockClock::new();
    let mut n = node(&clock);

    let image = vec![0x55u8; IMAGE_BUFFER_SIZE];
    n.link_mut().feed(&frame("DIMG", &image));
    n.poll_once().unwrap();
    n.link_mut().take_transmitted();

    n.link_mut().feed(&frame("SRESET", &[]));
    n.poll_once().unwrap();

    assert_eq!(n.link_mut().take_transmitted().as_slice(), b"OK10\nrestarting\n");
    assert_eq!(n.link_mut().flush_count(), 1);
    assert_eq!(n.system().restart_count(), 1);
    assert_eq!(n.display().fill_state(), FillState::Empty);
    assert_eq!(n.display().cursor(), 0);
}

#[test]
fn line_noise_before_a_frame_is_ignored() {
    let clock = MockClock::new();
    let mut n = node(&clock);

    n.link_mut().feed(b"\x00\xFFgarbage\n");
    n.link_mut().feed(&frame("SPING", &[]));
    n.poll_once().unwrap();

    assert_eq!(n.link_mut().take_transmitted().as_slice(), b"OK4\nPONG\n");
}
