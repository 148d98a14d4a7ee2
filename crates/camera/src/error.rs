use std::{
    fmt::{self, Display},
    io,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    NotFound,
    Busy,
    /// The device stopped delivering frames after it was opened.
    Disconnected,
    /// Built without a native capture backend.
    Unsupported,
}

impl Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NotFound => f.write_str("camera not found"),
            CameraError::Busy => f.write_str("camera is in use by another application"),
            CameraError::Disconnected => f.write_str("camera disconnected"),
            CameraError::Unsupported => f.write_str("camera support is not compiled in"),
        }
    }
}

impl std::error::Error for CameraError {}

pub(crate) enum CaptureError {
    TimedOut,
    /// One bad frame; the device is still delivering.
    Corrupt(io::Error),
    Lost(io::Error),
}

impl From<io::Error> for CaptureError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => {
                CaptureError::TimedOut
            }
            io::ErrorKind::InvalidData => CaptureError::Corrupt(error),
            _ => CaptureError::Lost(error),
        }
    }
}
