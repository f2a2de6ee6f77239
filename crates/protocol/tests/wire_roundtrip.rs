//! End-to-end wire checks: host-side encoding through the device-side parser.

#![allow(clippy::unwrap_used, clippy::panic)]

use protocol::{encode_frame, FrameEvent, FrameParser, MotorVelocity};

#[test]
fn encoded_frames_validate_on_decode() {
    let payloads: &[&[u8]] = &[
        b"",
        b"x",
        b"123456789",
        &[0x00, 0xFF, 0x0A, 0x0A, 0x7F, 0x80],
    ];

    for payload in payloads {
        let mut wire: heapless::Vec<u8, 64> = heapless::Vec::new();
        encode_frame("DIMG", payload, &mut wire).unwrap();

        let mut parser: FrameParser<64> = FrameParser::new();
        let mut seen = false;
        for &b in wire.iter() {
            match parser.push(b) {
                Some(FrameEvent::Frame { command, payload: p }) => {
                    assert_eq!(command, "DIMG");
                    assert_eq!(p, *payload);
                    seen = true;
                }
                Some(FrameEvent::CrcMismatch { .. }) => {
                    panic!("well-formed frame must pass CRC validation")
                }
                None => {}
            }
        }
        assert!(seen, "payload {payload:?} did not complete a frame");
    }
}

#[test]
fn corrupting_one_payload_byte_is_detected() {
    let velocity = MotorVelocity {
        left: 100,
        right: -100,
        duration_ms: 500,
    };
    let mut wire: heapless::Vec<u8, 64> = heapless::Vec::new();
    encode_frame("MVEL", &velocity.encode(), &mut wire).unwrap();

    // Flip one bit in the first payload byte (right after the header '\n').
    let header_end = wire.iter().position(|&b| b == b'\n').unwrap();
    *wire.get_mut(header_end + 1).unwrap() ^= 0x01;

    let mut parser: FrameParser<64> = FrameParser::new();
    let mut mismatch = false;
    for &b in wire.iter() {
        match parser.push(b) {
            Some(FrameEvent::CrcMismatch { expected, received }) => {
                assert_ne!(expected, received);
                mismatch = true;
            }
            Some(FrameEvent::Frame { .. }) => panic!("corrupt frame must not dispatch"),
            None => {}
        }
    }
    assert!(mismatch);
}
