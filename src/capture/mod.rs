mod image_files;
#[cfg(feature = "camera")]
mod webcam;

pub use image_files::ImageSequence;
#[cfg(feature = "camera")]
pub use webcam::WebcamCapture;

use anyhow::Result;
use image::RgbImage;

use crate::error::FrameError;

/// Trait for frame sources
pub trait CaptureSource {
    /// Capture a single frame
    ///
    /// # Returns
    /// * `Ok(None)` once a finite source is exhausted
    fn capture_frame(&mut self) -> Result<Option<RgbImage>>;

    /// Get the resolution of captured frames
    fn resolution(&self) -> (u32, u32);
}

/// Decode an encoded image (JPEG, PNG, ...) into an RGB frame
pub fn decode_frame(bytes: &[u8]) -> Result<RgbImage, FrameError> {
    if bytes.is_empty() {
        return Err(FrameError::Empty);
    }

    let frame = image::load_from_memory(bytes)?.to_rgb8();
    if frame.width() == 0 || frame.height() == 0 {
        return Err(FrameError::ZeroSized);
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};
    use std::io::Cursor;

    #[test]
    fn test_decode_png() {
        let img = RgbImage::from_pixel(8, 4, Rgb([200, 150, 120]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let frame = decode_frame(&bytes).unwrap();
        assert_eq!(frame.dimensions(), (8, 4));
        assert_eq!(*frame.get_pixel(3, 2), Rgb([200, 150, 120]));
    }

    #[test]
    fn test_decode_failures() {
        assert!(matches!(decode_frame(&[]), Err(FrameError::Empty)));
        assert!(matches!(
            decode_frame(b"definitely not an image"),
            Err(FrameError::Decode(_))
        ));
    }
}
