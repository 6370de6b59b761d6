use lexi_image::ImageError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum CameraError {
    /// The platform refused access to the device.
    PermissionDenied(String),
    /// No usable device exists at the configured path.
    DeviceUnavailable(String),
    /// The capture stream failed after the device was opened.
    Stream(String),
    /// A captured buffer could not be decoded into a frame.
    Decode(ImageError),
    /// The channel between the capture thread and the caller broke.
    Channel(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::PermissionDenied(msg) => write!(f, "camera permission denied: {msg}"),
            CameraError::DeviceUnavailable(msg) => write!(f, "camera device unavailable: {msg}"),
            CameraError::Stream(msg) => write!(f, "capture stream error: {msg}"),
            CameraError::Decode(err) => write!(f, "frame decode error: {err}"),
            CameraError::Channel(msg) => write!(f, "capture channel error: {msg}"),
        }
    }
}

impl std::error::Error for CameraError {}

impl From<io::Error> for CameraError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => CameraError::PermissionDenied(err.to_string()),
            io::ErrorKind::NotFound => CameraError::DeviceUnavailable(err.to_string()),
            _ => CameraError::Stream(err.to_string()),
        }
    }
}

impl From<ImageError> for CameraError {
    fn from(err: ImageError) -> Self {
        CameraError::Decode(err)
    }
}
