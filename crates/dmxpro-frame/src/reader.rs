use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};
use dmxpro_transport::SerialStream;
use tracing::{trace, warn};

use crate::codec::{decode_stream, Frame, FrameConfig, START};
use crate::error::{FrameError, Result};
use crate::label::label_name;
use crate::writer::apply_serial_timeout;

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 256;

/// Pulls whole frames out of a `Read` source.
///
/// Bytes are buffered across reads until a frame is complete; anything left
/// over stays buffered for the next call.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Block until the next frame is complete.
    ///
    /// End of stream is [`FrameError::ConnectionClosed`], even in the middle
    /// of a frame. On a serial port a read timeout comes back as
    /// [`FrameError::Io`] with kind `TimedOut`.
    ///
    /// A malformed or oversized frame is returned as an error once, after its
    /// bytes are dropped up to the next start delimiter, so the following
    /// call picks up at the next frame.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            match decode_stream(&mut self.buf, self.config.max_payload_size) {
                Ok(Some(frame)) => {
                    trace!(label = frame.label, len = frame.payload.len(), "read frame");
                    return Ok(frame);
                }
                Ok(None) => self.fill()?,
                Err(err @ (FrameError::MalformedFrame(_) | FrameError::FrameTooLarge { .. })) => {
                    self.resync();
                    return Err(err);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Read frames until one carries `label`, dropping the rest.
    ///
    /// Widgets may interleave unsolicited input frames (received DMX,
    /// change-of-state) with replies, and a port opened mid-stream starts
    /// with a partial frame. Malformed frames are skipped like unrelated ones.
    pub fn read_frame_with_label(&mut self, label: u8) -> Result<Frame> {
        loop {
            let frame = match self.read_frame() {
                Ok(frame) => frame,
                Err(FrameError::MalformedFrame(reason)) => {
                    trace!(expected = label_name(label), reason, "skipping malformed frame");
                    continue;
                }
                Err(err) => return Err(err),
            };
            if frame.label == label {
                return Ok(frame);
            }
            trace!(
                expected = label_name(label),
                got = label_name(frame.label),
                "skipping unrelated frame"
            );
        }
    }

    /// Bytes received but not yet part of a returned frame.
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Give back the source. Buffered bytes are dropped.
    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    // Drop the byte at the head of the buffer and anything after it that
    // can't start a frame.
    fn resync(&mut self) {
        let skip = self
            .buf
            .iter()
            .skip(1)
            .position(|&b| b == START)
            .map_or(self.buf.len(), |pos| pos + 1);
        warn!(dropped = skip, "discarding bytes before next frame start");
        self.buf.advance(skip);
    }

    fn fill(&mut self) -> Result<()> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }
}

impl FrameReader<SerialStream> {
    /// Reader over a serial port, with `config.timeout` applied to the port.
    pub fn with_config_serial(mut inner: SerialStream, config: FrameConfig) -> Result<Self> {
        apply_serial_timeout(&mut inner, &config)?;
        Ok(Self::with_config(inner, config))
    }
}
