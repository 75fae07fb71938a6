mod color;
mod filters;
pub mod types;

pub use color::{mean_hsv, rgb_to_hsv, to_hsv};
pub use filters::{close, dilate, erode, gaussian_blur, open};
pub use types::{ColorRange, HsvImage, HsvMean, Mask, HUE_MAX};

use image::{Luma, RgbImage};

/// Default blur kernel edge length
pub const BLUR_KERNEL: u32 = 7;
/// Default morphology structuring element edge length
pub const MORPH_KERNEL: u32 = 5;

/// Skin-colour segmentation: frame in, binary hand mask out
///
/// Steps:
/// 1. Gaussian blur to suppress sensor noise
/// 2. Convert to HSV
/// 3. Threshold every pixel against the colour range
/// 4. Morphological open (drop specks) then close (fill small holes)
#[derive(Debug, Clone, Copy)]
pub struct ColorSegmenter {
    blur_kernel: u32,
    morph_kernel: u32,
}

impl Default for ColorSegmenter {
    fn default() -> Self {
        Self::new(BLUR_KERNEL, MORPH_KERNEL)
    }
}

impl ColorSegmenter {
    pub fn new(blur_kernel: u32, morph_kernel: u32) -> Self {
        Self {
            blur_kernel,
            morph_kernel,
        }
    }

    pub fn segment(&self, frame: &RgbImage, range: &ColorRange) -> Mask {
        let _span = tracing::debug_span!("segment").entered();

        let blurred = gaussian_blur(frame, self.blur_kernel);
        let hsv = to_hsv(&blurred);
        let mask = threshold(&hsv, range);

        let opened = open(&mask, self.morph_kernel);
        close(&opened, self.morph_kernel)
    }
}

/// 255 where the pixel lies inside the range (bounds inclusive), 0 elsewhere
pub fn threshold(hsv: &HsvImage, range: &ColorRange) -> Mask {
    Mask::from_fn(hsv.width(), hsv.height(), |x, y| {
        let p = hsv.get_pixel(x, y);
        if range.contains([p[0], p[1], p[2]]) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}
