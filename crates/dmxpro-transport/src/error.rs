use crate::discovery::PortQuery;

/// Errors that can occur in serial transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the named serial port.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// No attached port matched the lookup.
    #[error("no serial port found with {0}")]
    PortNotFound(PortQuery),

    /// The operating system refused to enumerate serial ports.
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(serialport::Error),

    /// Failed to change a setting on an open port.
    #[error("failed to configure serial port: {0}")]
    Configure(serialport::Error),

    /// An I/O error occurred on the serial stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
