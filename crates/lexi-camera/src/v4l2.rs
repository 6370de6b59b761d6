use crate::{CameraConfig, CameraError, FrameSource};
use lexi_base::Frame;
use lexi_image::{ImageError, yuyv_to_rgb};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

/// Resolution reported when the device has not told us its dimensions.
const FALLBACK_WIDTH: u32 = 640;
const FALLBACK_HEIGHT: u32 = 360;

type FrameResult = Result<Frame, CameraError>;

/// On-wire pixel layout negotiated with the device.
#[derive(Clone, Copy, Debug, PartialEq)]
enum PixelLayout {
    Mjpeg,
    Yuyv,
}

/// V4L2 camera backend.
///
/// Opening the device acquires exclusive capture access; the handle stays
/// open until the camera is dropped. Frames are captured on a background
/// thread and handed over through a bounded channel.
pub struct V4l2Camera {
    config: CameraConfig,
    layout: PixelLayout,
    width: u32,
    height: u32,
    device: Option<Device>,
    receiver: Option<mpsc::Receiver<FrameResult>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for V4l2Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Camera")
            .field("config", &self.config)
            .field("layout", &self.layout)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("device", &"<v4l::Device>")
            .field("streaming", &self.receiver.is_some())
            .finish()
    }
}

impl FrameSource for V4l2Camera {
    async fn current_frame(&mut self) -> Result<Frame, CameraError> {
        self.ensure_started()?;

        let receiver = self
            .receiver
            .as_mut()
            .ok_or_else(|| CameraError::Channel("receiver not initialized".to_string()))?;

        let mut latest = receiver
            .recv()
            .await
            .ok_or_else(|| CameraError::Channel("capture thread stopped".to_string()))??;

        // Frames may have queued since the last call; newest wins.
        while let Ok(next) = receiver.try_recv() {
            latest = next?;
        }

        Ok(latest)
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        // Drop the receiver to signal the thread to stop
        drop(self.receiver.take());

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl V4l2Camera {
    /// Open the device at `config.device()` and negotiate a capture format.
    ///
    /// MJPEG is preferred; YUYV is the fallback. This is the acquisition
    /// point: a denied open maps to `CameraError::PermissionDenied`, a
    /// missing device to `CameraError::DeviceUnavailable`.
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        let device = Device::with_path(config.device())?;

        let (format, layout) = Self::negotiate_format(&device, &config)?;

        // Devices normally report their native resolution back; keep a fixed
        // fallback for the ones that report nothing.
        let (width, height) = if format.width == 0 || format.height == 0 {
            (FALLBACK_WIDTH, FALLBACK_HEIGHT)
        } else {
            (format.width, format.height)
        };

        let params = v4l::video::capture::Parameters::with_fps(config.fps());
        v4l::video::Capture::set_params(&device, &params)?;

        log::debug!(
            "opened {} as {:?} {}x{} @ {} fps",
            config.device(),
            layout,
            width,
            height,
            config.fps()
        );

        Ok(Self {
            config,
            layout,
            width,
            height,
            device: Some(device),
            receiver: None,
            thread_handle: None,
        })
    }

    /// Try MJPEG first, then YUYV; a device may silently substitute another
    /// format, so the accepted fourcc is checked rather than trusted.
    fn negotiate_format(
        device: &Device,
        config: &CameraConfig,
    ) -> Result<(Format, PixelLayout), CameraError> {
        let candidates = [
            (FourCC::new(b"MJPG"), PixelLayout::Mjpeg),
            (FourCC::new(b"YUYV"), PixelLayout::Yuyv),
        ];

        for (fourcc, layout) in candidates {
            let requested = Format::new(config.width(), config.height(), fourcc);
            let accepted = Capture::set_format(device, &requested)?;
            if accepted.fourcc == fourcc {
                return Ok((accepted, layout));
            }
        }

        Err(CameraError::DeviceUnavailable(
            "device supports neither MJPEG nor YUYV capture".to_string(),
        ))
    }

    /// Start the capture thread if not already running.
    ///
    /// Called automatically on the first `current_frame()`.
    fn ensure_started(&mut self) -> Result<(), CameraError> {
        if self.receiver.is_some() {
            return Ok(());
        }

        let device = self
            .device
            .take()
            .ok_or_else(|| CameraError::Stream("device already consumed".to_string()))?;

        let buffer_count = self.config.buffer_count();
        let (tx, rx) = mpsc::channel(buffer_count.max(1) as usize);

        let layout = self.layout;
        let (width, height) = (self.width, self.height);

        let handle = thread::spawn(move || {
            if let Err(err) = Self::capture_loop(device, layout, width, height, &tx, buffer_count) {
                log::warn!("capture thread stopped: {err}");
                // Surface the failure to the next current_frame() call
                let _ = tx.blocking_send(Err(err));
            }
        });

        self.receiver = Some(rx);
        self.thread_handle = Some(handle);

        Ok(())
    }

    /// Background thread capture loop.
    ///
    /// Reads buffers from V4L2, converts them to RGB frames, and sends them
    /// through the channel until the receiver goes away.
    fn capture_loop(
        device: Device,
        layout: PixelLayout,
        width: u32,
        height: u32,
        tx: &mpsc::Sender<FrameResult>,
        buffer_count: u32,
    ) -> Result<(), CameraError> {
        let mut stream = MmapStream::with_buffers(&device, Type::VideoCapture, buffer_count)?;

        loop {
            let (buf, _metadata) = CaptureStream::next(&mut stream)?;

            let frame = match layout {
                PixelLayout::Mjpeg => lexi_image::decode_frame(buf)?,
                PixelLayout::Yuyv => {
                    let rgb = yuyv_to_rgb(buf, width, height).ok_or_else(|| {
                        CameraError::Stream(format!(
                            "short YUYV buffer: {} bytes for {width}x{height}",
                            buf.len()
                        ))
                    })?;
                    Frame::new(width, height, rgb).map_err(ImageError::from)?
                }
            };

            if tx.blocking_send(Ok(frame)).is_err() {
                // Receiver dropped - exit thread
                break;
            }
        }

        Ok(())
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Native frame dimensions as negotiated with the device.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
