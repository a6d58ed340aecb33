use std::fmt;
use std::io;

use dmxpro_controller::ControllerError;
use dmxpro_frame::FrameError;
use dmxpro_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const NOT_FOUND: i32 = 4;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

fn io_code(kind: io::ErrorKind) -> i32 {
    match kind {
        io::ErrorKind::NotFound => NOT_FOUND,
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::BrokenPipe | io::ErrorKind::UnexpectedEof => FAILURE,
        _ => TRANSPORT_ERROR,
    }
}

fn serial_code(err: &serialport::Error) -> i32 {
    match err.kind() {
        serialport::ErrorKind::NoDevice => NOT_FOUND,
        serialport::ErrorKind::InvalidInput => USAGE,
        serialport::ErrorKind::Io(kind) => io_code(kind),
        _ => TRANSPORT_ERROR,
    }
}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(io_code(err.kind()), format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = match &err {
        TransportError::PortNotFound(_) => NOT_FOUND,
        TransportError::Open { source, .. } | TransportError::Configure(source) => {
            serial_code(source)
        }
        TransportError::Io(source) => io_code(source.kind()),
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        FrameError::FrameTooLarge { .. } | FrameError::MalformedFrame(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn controller_error(context: &str, err: ControllerError) -> CliError {
    match err {
        ControllerError::Transport(err) => transport_error(context, err),
        ControllerError::Frame(err) => frame_error(context, err),
        ControllerError::TransportWrite(err) => io_error(context, err),
        ControllerError::ChannelOutOfRange { .. }
        | ControllerError::ValueOutOfRange { .. }
        | ControllerError::InvalidConfig(_)
        | ControllerError::InvalidParameter(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use dmxpro_transport::PortQuery;

    use super::*;

    #[test]
    fn missing_port_is_not_found() {
        let err = transport_error(
            "resolve port",
            TransportError::PortNotFound(PortQuery::SerialNumber("EN123456".into())),
        );
        assert_eq!(err.code, NOT_FOUND);
        assert!(err.message.starts_with("resolve port: "));
    }

    #[test]
    fn write_timeout_maps_to_timeout() {
        let err = controller_error(
            "submit",
            ControllerError::TransportWrite(io::Error::from(io::ErrorKind::TimedOut)),
        );
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn bad_channel_is_usage() {
        let err = controller_error(
            "set",
            ControllerError::ChannelOutOfRange {
                channel: 600,
                size: 512,
            },
        );
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn malformed_reply_is_data_invalid() {
        let err = controller_error(
            "params",
            ControllerError::Frame(FrameError::MalformedFrame("missing end delimiter")),
        );
        assert_eq!(err.code, DATA_INVALID);
    }
}
