use crate::CameraError;
use lexi_base::Frame;

/// Async source of live camera frames.
///
/// Implementations hold the underlying device open for their whole lifetime;
/// acquiring access happens once, at construction, and `current_frame` is
/// repeatable without re-prompting the platform.
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    /// Return the most recent sample from the feed, at the device's native
    /// resolution.
    async fn current_frame(&mut self) -> Result<Frame, CameraError>;
}
