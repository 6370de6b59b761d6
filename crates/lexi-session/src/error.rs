use lexi_camera::CameraError;
use lexi_client::ClientError;
use lexi_image::ImageError;
use std::fmt;

/// Everything that can sink one capture-encode-submit cycle.
///
/// None of these are fatal to the session; a failed cycle renders its error
/// and the next cycle is scheduled regardless.
#[derive(Debug)]
pub enum CycleError {
    Capture(CameraError),
    Encode(ImageError),
    Submit(ClientError),
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleError::Capture(err) => write!(f, "frame capture failed: {err}"),
            CycleError::Encode(err) => write!(f, "frame encoding failed: {err}"),
            CycleError::Submit(err) => write!(f, "submission failed: {err}"),
        }
    }
}

impl std::error::Error for CycleError {}

impl From<CameraError> for CycleError {
    fn from(err: CameraError) -> Self {
        CycleError::Capture(err)
    }
}

impl From<ImageError> for CycleError {
    fn from(err: ImageError) -> Self {
        CycleError::Encode(err)
    }
}

impl From<ClientError> for CycleError {
    fn from(err: ClientError) -> Self {
        CycleError::Submit(err)
    }
}
