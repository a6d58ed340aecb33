/// Errors that can occur in controller operations.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// Channel number outside `1..=size`.
    #[error("channel {channel} out of range (1..={size})")]
    ChannelOutOfRange { channel: usize, size: usize },

    /// Channel value outside `0..=255`.
    #[error("value {value} out of range (0..=255)")]
    ValueOutOfRange { value: i64 },

    /// Controller configuration rejected at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Widget parameter outside the range the widget accepts.
    #[error("invalid widget parameter: {0}")]
    InvalidParameter(String),

    /// Writing a frame to the transport failed. Nothing was committed.
    #[error("transport write failed: {0}")]
    TransportWrite(std::io::Error),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] dmxpro_frame::FrameError),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] dmxpro_transport::TransportError),
}

pub type Result<T> = std::result::Result<T, ControllerError>;
