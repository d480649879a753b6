use thiserror::Error;

/// Everything that can go wrong while acquiring or reading a motion source.
///
/// None of these reach the arbitrator: drivers log them and report a start
/// result instead, `StartDenied` for a refused permission and a plain
/// `false` otherwise.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackingError {
    #[error("permission denied for {0}")]
    PermissionDenied(&'static str),
    #[error("{0} hardware unavailable")]
    HardwareUnavailable(&'static str),
    #[error("face detection library failed to load: {0}")]
    LibraryLoadFailure(String),
    #[error("video stream not ready after {0} ms")]
    Timeout(u32),
    #[error("invalid reading: {0}")]
    InvalidReading(&'static str),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TrackingError>;
