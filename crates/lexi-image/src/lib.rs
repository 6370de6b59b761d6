//! JPEG encode/decode for live camera frames.
//!
//! A thin wrapper around the `image` crate that converts between raw RGB
//! `Frame`s from `lexi-base` and compressed payloads ready for transmission.

pub mod convert;
pub mod error;
pub mod types;

pub use convert::yuyv_to_rgb;
pub use error::ImageError;
pub use types::{EncodedFrame, MEDIA_TYPE_JPEG};

use crates_image::ImageEncoder;
use crates_image::codecs::jpeg::JpegEncoder;
use lexi_base::Frame;

/// Compresses a raw frame into a JPEG payload.
///
/// `quality` is the JPEG quality factor, 1-100. Compression is deterministic
/// for a given frame and quality.
///
/// # Errors
///
/// Returns `ImageError::Encode` if the frame has zero width or height, or if
/// the encoder rejects the pixel buffer. A failed encode never yields an
/// empty payload.
pub fn encode_jpeg(frame: &Frame, quality: u8) -> Result<EncodedFrame, ImageError> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(ImageError::Encode(format!(
            "frame has zero dimension: {}x{}",
            frame.width(),
            frame.height()
        )));
    }

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .write_image(
            frame.data(),
            frame.width(),
            frame.height(),
            crates_image::ExtendedColorType::Rgb8,
        )
        .map_err(|err| ImageError::Encode(err.to_string()))?;

    Ok(EncodedFrame::jpeg(bytes))
}

/// Decodes a compressed image (JPEG/MJPEG) into an RGB frame.
///
/// The format is auto-detected by the `image` crate; whatever the source
/// pixel layout, the result is flattened to RGB8.
///
/// # Errors
///
/// Returns `ImageError::Decode` if the data is malformed or unsupported.
pub fn decode_frame(data: &[u8]) -> Result<Frame, ImageError> {
    let img = crates_image::load_from_memory(data)?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    Ok(Frame::new(width, height, rgb.into_raw())?)
}
