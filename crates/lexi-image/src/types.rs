/// Media type of JPEG payloads.
pub const MEDIA_TYPE_JPEG: &str = "image/jpeg";

/// A compressed frame ready for transmission.
///
/// Owned by the in-flight request once submitted; discarded after the
/// transmission completes or fails.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedFrame {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
}

impl EncodedFrame {
    /// Wrap JPEG bytes.
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            media_type: MEDIA_TYPE_JPEG,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
