use std::{
    fmt::{self, Display},
    io,
};

/// Resource-level failure of a link. Fatal to the reader that reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    NotFound,
    PermissionDenied,
    AlreadyOpen,
    Disconnected,
    /// Failure the operating system did not let us classify.
    Io(String),
}

impl Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::NotFound => f.write_str("serial port not found"),
            LinkError::PermissionDenied => f.write_str("permission denied opening serial port"),
            LinkError::AlreadyOpen => f.write_str("serial port is already in use"),
            LinkError::Disconnected => f.write_str("serial port disconnected"),
            LinkError::Io(description) => write!(f, "serial port error: {description}"),
        }
    }
}

impl std::error::Error for LinkError {}

impl From<serialport::Error> for LinkError {
    fn from(error: serialport::Error) -> Self {
        if held_elsewhere(&error) {
            return LinkError::AlreadyOpen;
        }

        match error.kind() {
            serialport::ErrorKind::NoDevice => LinkError::NotFound,
            serialport::ErrorKind::Io(io::ErrorKind::NotFound) => LinkError::NotFound,
            serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => {
                LinkError::PermissionDenied
            }
            _ => LinkError::Io(error.description),
        }
    }
}

/// Whether the OS refused the port because another process has it open.
#[cfg(not(windows))]
fn held_elsewhere(error: &serialport::Error) -> bool {
    error.description.to_ascii_lowercase().contains("busy")
}

/// COM ports are opened exclusively, so Windows reports one held by another
/// process as access denied rather than busy.
#[cfg(windows)]
fn held_elsewhere(error: &serialport::Error) -> bool {
    matches!(
        error.kind(),
        serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied)
    ) || error
        .description
        .to_ascii_lowercase()
        .contains("access is denied")
}

/// Outcome of a single blocking read that did not produce a line.
#[derive(Debug)]
pub(crate) enum TransportError {
    /// No complete line within the read timeout; the link is still healthy.
    TimedOut,
    Disconnected(io::Error),
}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => {
                TransportError::TimedOut
            }
            // Unplugging surfaces as a different error kind per platform.
            _ => TransportError::Disconnected(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_errors_keep_their_reason() {
        let not_found = serialport::Error::new(serialport::ErrorKind::NoDevice, "no such device");
        let odd = serialport::Error::new(serialport::ErrorKind::Unknown, "line discipline");

        assert_eq!(LinkError::from(not_found), LinkError::NotFound);
        assert_eq!(
            LinkError::from(odd),
            LinkError::Io("line discipline".into())
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn busy_port_is_already_open() {
        let denied = serialport::Error::new(
            serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied),
            "Permission denied",
        );
        let busy = serialport::Error::new(
            serialport::ErrorKind::Unknown,
            "Device or resource busy",
        );

        assert_eq!(LinkError::from(denied), LinkError::PermissionDenied);
        assert_eq!(LinkError::from(busy), LinkError::AlreadyOpen);
    }

    #[cfg(windows)]
    #[test]
    fn access_denied_com_port_is_already_open() {
        let denied = serialport::Error::new(
            serialport::ErrorKind::NoDevice,
            "Access is denied.",
        );

        assert_eq!(LinkError::from(denied), LinkError::AlreadyOpen);
    }

    #[test]
    fn timeouts_are_not_disconnects() {
        assert!(matches!(
            TransportError::from(io::Error::from(io::ErrorKind::TimedOut)),
            TransportError::TimedOut
        ));
        assert!(matches!(
            TransportError::from(io::Error::from(io::ErrorKind::BrokenPipe)),
            TransportError::Disconnected(_)
        ));
    }
}
