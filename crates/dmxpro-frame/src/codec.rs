use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Start delimiter.
pub const START: u8 = 0x7E;

/// End delimiter.
pub const END: u8 = 0xE7;

/// Frame header: start (1) + label (1) + length (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Smallest valid frame: header + end delimiter, empty payload.
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + 1;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// Default maximum payload size accepted by readers and writers.
pub const DEFAULT_MAX_PAYLOAD: usize = MAX_PAYLOAD;

/// A framed widget message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command label.
    pub label: u8,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(label: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            label,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload + end delimiter).
    pub fn wire_size(&self) -> usize {
        MIN_FRAME_SIZE + self.payload.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────┬───────┬───────────┬──────────────────┬──────┐
/// │ Start │ Label │ Length    │ Payload          │ End  │
/// │ 0x7E  │ (1B)  │ (2B LE)   │ (Length bytes)   │ 0xE7 │
/// └───────┴───────┴───────────┴──────────────────┴──────┘
/// ```
pub fn encode_frame(label: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::FrameTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(MIN_FRAME_SIZE + payload.len());
    dst.put_u8(START);
    dst.put_u8(label);
    dst.put_u16_le(payload.len() as u16);
    dst.put_slice(payload);
    dst.put_u8(END);
    Ok(())
}

/// Decode exactly one complete frame.
///
/// `src` must hold the whole frame and nothing else; the declared length has
/// to account for every byte between the header and the end delimiter.
pub fn decode_frame(src: &[u8]) -> Result<Frame> {
    if src.len() < MIN_FRAME_SIZE {
        return Err(FrameError::MalformedFrame("frame shorter than 5 bytes"));
    }
    if src[0] != START {
        return Err(FrameError::MalformedFrame("missing start delimiter"));
    }
    if src[src.len() - 1] != END {
        return Err(FrameError::MalformedFrame("missing end delimiter"));
    }

    let declared = u16::from_le_bytes([src[2], src[3]]) as usize;
    let payload = &src[HEADER_SIZE..src.len() - 1];
    if declared != payload.len() {
        return Err(FrameError::MalformedFrame(
            "declared length does not match payload",
        ));
    }

    Ok(Frame {
        label: src[1],
        payload: Bytes::copy_from_slice(payload),
    })
}

/// Decode a frame from the front of a stream buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_stream(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.is_empty() {
        return Ok(None);
    }
    if src[0] != START {
        return Err(FrameError::MalformedFrame("missing start delimiter"));
    }
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    let label = src[1];
    let payload_len = u16::from_le_bytes([src[2], src[3]]) as usize;

    if payload_len > max_payload {
        return Err(FrameError::FrameTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = MIN_FRAME_SIZE + payload_len;
    if src.len() < total {
        return Ok(None); // Need more data
    }
    if src[total - 1] != END {
        return Err(FrameError::MalformedFrame("missing end delimiter"));
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();
    src.advance(1);

    Ok(Some(Frame { label, payload }))
}

/// Configuration for frame readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 65535.
    pub max_payload_size: usize,
    /// Timeout applied to the serial port when a reader or writer is built
    /// over one. `None` leaves the port's current timeout alone.
    pub timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{GET_WIDGET_SERIAL_NUMBER, SEND_DMX};

    #[test]
    fn test_single_channel_frame_bytes() {
        let mut buf = BytesMut::new();
        encode_frame(SEND_DMX, &[0x00, 0xFF], &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0x7E, 0x06, 0x02, 0x00, 0x00, 0xFF, 0xE7]);
    }

    #[test]
    fn test_full_universe_length_field() {
        let mut payload = vec![0u8; 513];
        payload[512] = 0x42;
        let mut buf = BytesMut::new();
        encode_frame(SEND_DMX, &payload, &mut buf).unwrap();

        assert_eq!(buf.len(), MIN_FRAME_SIZE + 513);
        assert_eq!(&buf[..4], &[0x7E, 0x06, 0x01, 0x02]);
        assert_eq!(buf[buf.len() - 2], 0x42);
        assert_eq!(buf[buf.len() - 1], END);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        for len in [0usize, 1, 2, 25, 512, 513] {
            let payload: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let mut buf = BytesMut::new();
            encode_frame(0x91, &payload, &mut buf).unwrap();

            let frame = decode_frame(&buf).unwrap();
            assert_eq!(frame.label, 0x91);
            assert_eq!(frame.payload.as_ref(), payload.as_slice());
            assert_eq!(frame.wire_size(), buf.len());
        }
    }

    #[test]
    fn test_encode_rejects_oversized_payload() {
        let payload = vec![0u8; MAX_PAYLOAD + 1];
        let mut buf = BytesMut::new();
        let err = encode_frame(SEND_DMX, &payload, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::FrameTooLarge {
                size,
                max: MAX_PAYLOAD
            } if size == MAX_PAYLOAD + 1
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_too_short() {
        let err = decode_frame(&[0x7E, 0x06, 0x00, 0x00]).unwrap_err();
        assert!(matches!(err, FrameError::MalformedFrame(_)));
    }

    #[test]
    fn test_decode_bad_delimiters() {
        let err = decode_frame(&[0x00, 0x06, 0x00, 0x00, 0xE7]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::MalformedFrame("missing start delimiter")
        ));

        let err = decode_frame(&[0x7E, 0x06, 0x00, 0x00, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::MalformedFrame("missing end delimiter")
        ));
    }

    #[test]
    fn test_decode_length_mismatch() {
        let err = decode_frame(&[0x7E, 0x06, 0x03, 0x00, 0x00, 0xFF, 0xE7]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::MalformedFrame("declared length does not match payload")
        ));
    }

    #[test]
    fn test_decode_empty_payload() {
        let frame = decode_frame(&[0x7E, GET_WIDGET_SERIAL_NUMBER, 0x00, 0x00, 0xE7]).unwrap();
        assert_eq!(frame.label, GET_WIDGET_SERIAL_NUMBER);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_stream_incomplete() {
        let mut buf = BytesMut::from(&[0x7E, 0x06][..]);
        assert!(decode_stream(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap().is_none());

        let mut buf = BytesMut::from(&[0x7E, 0x06, 0x02, 0x00, 0x00][..]);
        assert!(decode_stream(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap().is_none());
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn test_stream_multiple_frames() {
        let mut buf = BytesMut::new();
        encode_frame(3, b"first", &mut buf).unwrap();
        encode_frame(10, b"", &mut buf).unwrap();

        let f1 = decode_stream(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(f1.label, 3);
        assert_eq!(f1.payload.as_ref(), b"first");

        let f2 = decode_stream(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(f2.label, 10);
        assert!(f2.payload.is_empty());

        assert!(buf.is_empty());
    }

    #[test]
    fn test_stream_invalid_start() {
        let mut buf = BytesMut::from(&[0xFF, 0x06, 0x00, 0x00, 0xE7][..]);
        let result = decode_stream(&mut buf, DEFAULT_MAX_PAYLOAD);
        assert!(matches!(result, Err(FrameError::MalformedFrame(_))));
    }

    #[test]
    fn test_stream_invalid_end() {
        let mut buf = BytesMut::from(&[0x7E, 0x06, 0x01, 0x00, 0x00, 0x00][..]);
        let result = decode_stream(&mut buf, DEFAULT_MAX_PAYLOAD);
        assert!(matches!(
            result,
            Err(FrameError::MalformedFrame("missing end delimiter"))
        ));
    }

    #[test]
    fn test_stream_payload_too_large() {
        let mut buf = BytesMut::new();
        buf.put_u8(START);
        buf.put_u8(5);
        buf.put_u16_le(600);

        let result = decode_stream(&mut buf, 513);
        assert!(matches!(
            result,
            Err(FrameError::FrameTooLarge { size: 600, max: 513 })
        ));
    }
}
