/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload does not fit the frame's 16-bit length field (or the
    /// configured maximum).
    #[error("frame too large ({size} byte payload, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// Bytes read from the widget do not form a valid frame.
    #[error("malformed frame: {0}")]
    MalformedFrame(&'static str),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was closed before a complete frame was transferred.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
