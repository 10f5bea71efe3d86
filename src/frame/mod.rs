//! Still-frame capture and compression
//!
//! Frames come from a local camera or a remote "hardware" stream and are
//! compressed to JPEG for transfer. Local frames are additionally downscaled
//! to keep payloads small over the analysis path.

mod source;

pub use source::{CaptureKind, FrameSource, SnapshotSource, TestPatternSource};

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::{Error, Result};

/// JPEG quality used for analysis payloads
pub const JPEG_QUALITY: u8 = 70;

/// Linear downscale factor applied to local camera frames
pub const LOCAL_SCALE: f32 = 0.7;

/// An uncompressed RGB8 frame
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGB8 pixel data, `width * height * 3` bytes
    pub pixels: Vec<u8>,
}

impl RawFrame {
    /// Whether the source reported usable dimensions
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Compress a frame to JPEG at [`JPEG_QUALITY`]
///
/// With `downscale` set (local camera frames) the frame is first resized to
/// [`LOCAL_SCALE`] of its linear dimensions.
///
/// # Errors
///
/// Returns [`Error::Media`] when the frame has zero dimensions ("frame not
/// ready") or the pixel buffer doesn't match them.
pub fn encode_jpeg(frame: &RawFrame, downscale: bool) -> Result<Vec<u8>> {
    if !frame.is_ready() {
        return Err(Error::Media("frame not ready".to_string()));
    }

    let image = RgbImage::from_raw(frame.width, frame.height, frame.pixels.clone())
        .ok_or_else(|| Error::Media("pixel buffer does not match frame dimensions".to_string()))?;

    let image = if downscale {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let (w, h) = (
            ((frame.width as f32 * LOCAL_SCALE) as u32).max(1),
            ((frame.height as f32 * LOCAL_SCALE) as u32).max(1),
        );
        image::imageops::resize(&image, w, h, image::imageops::FilterType::Triangle)
    } else {
        image
    };

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .encode_image(&image)
        .map_err(|e| Error::Media(format!("jpeg encode failed: {e}")))?;

    tracing::debug!(
        bytes = bytes.len(),
        width = image.width(),
        height = image.height(),
        downscaled = downscale,
        "frame encoded"
    );
    Ok(bytes)
}

/// Decode an image payload (JPEG/PNG) into a raw frame
///
/// # Errors
///
/// Returns [`Error::Media`] when the payload is not a decodable image.
pub fn decode(bytes: &[u8]) -> Result<RawFrame> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| Error::Media(format!("image decode failed: {e}")))?
        .to_rgb8();

    Ok(RawFrame {
        width: image.width(),
        height: image.height(),
        pixels: image.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: u32, height: u32) -> RawFrame {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                #[allow(clippy::cast_possible_truncation)]
                pixels.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, 128]);
            }
        }
        RawFrame {
            width,
            height,
            pixels,
        }
    }

    #[test]
    fn zero_dimension_frame_is_not_ready() {
        let frame = RawFrame {
            width: 0,
            height: 480,
            pixels: Vec::new(),
        };
        let err = encode_jpeg(&frame, false).unwrap_err();
        assert!(err.to_string().contains("frame not ready"));
    }

    #[test]
    fn encode_produces_jpeg_magic() {
        let jpeg = encode_jpeg(&gradient_frame(64, 48), false).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn downscale_shrinks_to_seventy_percent() {
        let jpeg = encode_jpeg(&gradient_frame(100, 200), true).unwrap();
        let decoded = decode(&jpeg).unwrap();
        assert_eq!(decoded.width, 70);
        assert_eq!(decoded.height, 140);
    }

    #[test]
    fn remote_frames_keep_full_dimensions() {
        let jpeg = encode_jpeg(&gradient_frame(100, 200), false).unwrap();
        let decoded = decode(&jpeg).unwrap();
        assert_eq!(decoded.width, 100);
        assert_eq!(decoded.height, 200);
    }

    #[test]
    fn mismatched_pixel_buffer_is_rejected() {
        let frame = RawFrame {
            width: 10,
            height: 10,
            pixels: vec![0; 5],
        };
        assert!(encode_jpeg(&frame, false).is_err());
    }
}
