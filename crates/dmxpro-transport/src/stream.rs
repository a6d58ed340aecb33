use std::io::{Read, Write};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};

/// Baud rate the widget's virtual COM port is opened with.
///
/// The USB side ignores it, but some host drivers refuse to open without one.
pub const DEFAULT_BAUD_RATE: u32 = 57_600;

/// Default blocking read/write timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for opening a serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Line speed in bits per second. Default: 57600.
    pub baud_rate: u32,
    /// Timeout applied to blocking reads and writes. Default: 1s.
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// An open serial connection to a widget, readable and writable.
///
/// Closing happens on drop.
pub struct SerialStream {
    port: Box<dyn serialport::SerialPort>,
    name: String,
}

impl SerialStream {
    /// Open the port identified by `port` (e.g. `/dev/ttyUSB0`, `COM3`).
    pub fn open(port: &str, config: &SerialConfig) -> Result<Self> {
        let handle = serialport::new(port, config.baud_rate)
            .timeout(config.timeout)
            .open()
            .map_err(|source| TransportError::Open {
                port: port.to_string(),
                source,
            })?;
        debug!(port, baud_rate = config.baud_rate, "opened serial port");
        Ok(Self {
            port: handle,
            name: port.to_string(),
        })
    }

    /// The port identifier this stream was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current blocking timeout.
    pub fn timeout(&self) -> Duration {
        self.port.timeout()
    }

    /// Set the blocking timeout for subsequent reads and writes.
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.port
            .set_timeout(timeout)
            .map_err(TransportError::Configure)
    }

    /// Try to clone this stream (a second handle on the same device).
    ///
    /// Used to split one port into a frame reader and a frame writer.
    pub fn try_clone(&self) -> Result<Self> {
        let port = self.port.try_clone().map_err(TransportError::Configure)?;
        Ok(Self {
            port,
            name: self.name.clone(),
        })
    }
}

impl Read for SerialStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port.flush()
    }
}

impl std::fmt::Debug for SerialStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialStream")
            .field("name", &self.name)
            .finish()
    }
}
