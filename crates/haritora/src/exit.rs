use std::fmt;
use std::io;

use haritora_frame::FrameError;
use haritora_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

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

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => USAGE,
        io::ErrorKind::ConnectionRefused => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Connect { source, .. } => io_error(context, source),
        TransportError::Bind { source, .. } if source.kind() == io::ErrorKind::PermissionDenied => {
            io_error(context, source)
        }
        TransportError::Io(source) => io_error(context, source),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::FrameTooLarge { .. } => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_connect_maps_to_failure() {
        let err = transport_error(
            "connect failed",
            TransportError::Connect {
                addr: "127.0.0.1:1".to_string(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            },
        );
        assert_eq!(err.code, FAILURE);
        assert!(err.message.starts_with("connect failed: "));
    }

    #[test]
    fn address_in_use_maps_to_transport_error() {
        let err = transport_error(
            "bind failed",
            TransportError::Bind {
                addr: "127.0.0.1:9876".to_string(),
                source: io::Error::from(io::ErrorKind::AddrInUse),
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn oversized_frame_maps_to_data_invalid() {
        let err = frame_error("read failed", FrameError::FrameTooLarge { size: 10, max: 4 });
        assert_eq!(err.code, DATA_INVALID);
    }
}
