use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use dmxpro_transport::{SerialStream, TransportError};
use tracing::trace;

use crate::codec::{encode_frame, Frame, FrameConfig};
use crate::error::{FrameError, Result};

// Fits a full 512-channel DMX frame without reallocating.
const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Frames payloads and pushes them out through a `Write` sink.
///
/// Each call to [`FrameWriter::send`] writes one whole frame and flushes, so
/// the widget never sees half a frame followed by a pause.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
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

    /// Send an already built [`Frame`].
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.label, frame.payload.as_ref()).map(|_| ())
    }

    /// Encode `payload` under `label` and write it out.
    ///
    /// Returns the number of bytes put on the wire.
    pub fn send(&mut self, label: u8, payload: &[u8]) -> Result<usize> {
        let max = self.config.max_payload_size;
        if payload.len() > max {
            return Err(FrameError::FrameTooLarge {
                size: payload.len(),
                max,
            });
        }

        self.buf.clear();
        encode_frame(label, payload, &mut self.buf)?;
        self.write_buffered()?;
        self.flush()?;

        trace!(label, len = self.buf.len(), "wrote frame");
        Ok(self.buf.len())
    }

    /// Flush the sink, retrying on `Interrupted`.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                result => return result.map_err(FrameError::Io),
            }
        }
    }

    // Short writes are common on USB serial; keep going until the frame is out.
    fn write_buffered(&mut self) -> Result<()> {
        let mut rest = &self.buf[..];
        while !rest.is_empty() {
            match self.inner.write(rest) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => rest = &rest[n..],
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Give back the sink. Nothing is buffered between sends.
    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameWriter<SerialStream> {
    /// Writer over a serial port, with `config.timeout` applied to the port.
    pub fn with_config_serial(mut inner: SerialStream, config: FrameConfig) -> Result<Self> {
        apply_serial_timeout(&mut inner, &config)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn apply_serial_timeout(port: &mut SerialStream, config: &FrameConfig) -> Result<()> {
    let Some(timeout) = config.timeout else {
        return Ok(());
    };
    port.set_timeout(timeout).map_err(|err| match err {
        TransportError::Io(io) => FrameError::Io(io),
        other => FrameError::Io(std::io::Error::other(other)),
    })
}
