//! # Wire codecs shared with the simulator
//!
//! Two fixed layouts cross the process boundary:
//!
//! - the position packet, little-endian `{bool, f64, f64, f64}` (25 bytes),
//!   sent over the UDP position channel, and
//! - the control-channel frame, a 2-byte header `{type_tag, payload_length}`
//!   followed by the payload, used by the simulator on the TCP control
//!   channel. UDP control messages carry the bare payload, one datagram per
//!   message.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::kinematics::PositionState;

/// Encoded size of a position packet.
pub const POSITION_PACKET_LEN: usize = 25;

/// Size of the control-channel frame header.
pub const FRAME_HEADER_LEN: usize = 2;

/// Type tag of a data frame on the control channel (ASCII 'D').
pub const DATA_FRAME_TAG: u8 = b'D';

/// Errors that can occur while encoding or decoding harness packets.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CodecError {
    #[error("Insufficient data: expected {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },
    #[error("Control payload of {0} bytes exceeds the one-byte length field")]
    PayloadTooLarge(usize),
}

/// Encodes a position fix into the 25-byte little-endian layout.
pub fn encode_position(position: &PositionState) -> Bytes {
    let mut buf = BytesMut::with_capacity(POSITION_PACKET_LEN);
    buf.put_u8(position.geodetic as u8);
    buf.put_f64_le(position.x);
    buf.put_f64_le(position.y);
    buf.put_f64_le(position.z);
    buf.freeze()
}

/// Decodes a position fix from the 25-byte little-endian layout.
pub fn decode_position(data: &[u8]) -> Result<PositionState, CodecError> {
    if data.len() < POSITION_PACKET_LEN {
        return Err(CodecError::InsufficientData {
            expected: POSITION_PACKET_LEN,
            actual: data.len(),
        });
    }
    let mut buf = data;
    Ok(PositionState {
        geodetic: buf.get_u8() != 0,
        x: buf.get_f64_le(),
        y: buf.get_f64_le(),
        z: buf.get_f64_le(),
    })
}

/// A control-channel frame as zero-copy slices into the received data.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ControlFrame<'a> {
    pub type_tag: u8,
    pub payload: &'a [u8],
}

/// Splits a frame header into its type tag and payload length.
pub fn decode_frame_header(header: [u8; FRAME_HEADER_LEN]) -> (u8, usize) {
    (header[0], header[1] as usize)
}

/// Encodes a control frame: `{type_tag, payload_length}` then the payload.
pub fn encode_frame(type_tag: u8, payload: &[u8]) -> Result<Bytes, CodecError> {
    if payload.len() > u8::MAX as usize {
        return Err(CodecError::PayloadTooLarge(payload.len()));
    }
    let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + payload.len());
    buf.put_u8(type_tag);
    buf.put_u8(payload.len() as u8);
    buf.put_slice(payload);
    Ok(buf.freeze())
}

/// Decodes a complete control frame from a buffer.
pub fn decode_frame(data: &[u8]) -> Result<ControlFrame<'_>, CodecError> {
    if data.len() < FRAME_HEADER_LEN {
        return Err(CodecError::InsufficientData {
            expected: FRAME_HEADER_LEN,
            actual: data.len(),
        });
    }
    let (type_tag, payload_length) = decode_frame_header([data[0], data[1]]);
    let frame_length = FRAME_HEADER_LEN + payload_length;
    if data.len() < frame_length {
        return Err(CodecError::InsufficientData {
            expected: frame_length,
            actual: data.len(),
        });
    }
    Ok(ControlFrame {
        type_tag,
        payload: &data[FRAME_HEADER_LEN..frame_length],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn position_round_trip() {
        let original = PositionState::new(false, 1.5, -2.25, 100.0);
        let encoded = encode_position(&original);
        assert_eq!(encoded.len(), POSITION_PACKET_LEN);
        let decoded = decode_position(&encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn position_rejects_short_buffer() {
        let err = decode_position(&[0u8; 10]).unwrap_err();
        assert_eq!(
            err,
            CodecError::InsufficientData {
                expected: POSITION_PACKET_LEN,
                actual: 10
            }
        );
    }

    #[test]
    fn frame_round_trip() {
        let encoded = encode_frame(DATA_FRAME_TAG, b"Message from node 2").unwrap();
        let frame = decode_frame(&encoded).unwrap();
        assert_eq!(frame.type_tag, DATA_FRAME_TAG);
        assert_eq!(frame.payload, b"Message from node 2");
    }

    #[test]
    fn frame_rejects_truncated_payload() {
        let mut encoded = encode_frame(DATA_FRAME_TAG, b"hello").unwrap().to_vec();
        encoded.truncate(4);
        assert!(matches!(
            decode_frame(&encoded),
            Err(CodecError::InsufficientData { .. })
        ));
    }

    #[test]
    fn frame_rejects_oversized_payload() {
        let payload = vec![0u8; 300];
        assert_eq!(
            encode_frame(DATA_FRAME_TAG, &payload).unwrap_err(),
            CodecError::PayloadTooLarge(300)
        );
    }

    proptest! {
        #[test]
        fn position_round_trip_any_fix(geodetic: bool, x: f64, y: f64, z: f64) {
            prop_assume!(x.is_finite() && y.is_finite() && z.is_finite());
            let original = PositionState::new(geodetic, x, y, z);
            let decoded = decode_position(&encode_position(&original)).unwrap();
            prop_assert_eq!(decoded, original);
        }
    }
}
