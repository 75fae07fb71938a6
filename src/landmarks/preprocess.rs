use anyhow::Result;
use image::{imageops, RgbImage};
use ndarray::Array4;

/// Memory layout of the model input tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    /// [1, 3, height, width]
    Nchw,
    /// [1, height, width, 3]
    Nhwc,
}

/// Preprocessor for converting RGB frames to landmark model input tensors
pub struct Preprocessor {
    target_width: u32,
    target_height: u32,
    layout: TensorLayout,
}

impl Preprocessor {
    pub fn new(target_width: u32, target_height: u32, layout: TensorLayout) -> Self {
        Self {
            target_width,
            target_height,
            layout,
        }
    }

    pub fn target_size(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    /// Preprocess an RGB image into a normalized tensor
    ///
    /// Steps:
    /// 1. Resize to target dimensions (aspect ratio is not preserved, so
    ///    normalized output coordinates map straight back onto the frame)
    /// 2. Convert to float and normalize to [0, 1]
    /// 3. Lay out as NCHW or NHWC
    pub fn preprocess(&self, image: &RgbImage) -> Result<Array4<f32>> {
        let _span = tracing::debug_span!("preprocess").entered();

        let (source_width, source_height) = image.dimensions();
        anyhow::ensure!(
            source_width > 0 && source_height > 0,
            "cannot preprocess an empty {}x{} frame",
            source_width,
            source_height
        );

        // Resize if needed
        let resized = if image.dimensions() != (self.target_width, self.target_height) {
            imageops::resize(
                image,
                self.target_width,
                self.target_height,
                imageops::FilterType::Triangle,
            )
        } else {
            image.clone()
        };

        let (width, height) = (self.target_width as usize, self.target_height as usize);
        let mut tensor = match self.layout {
            TensorLayout::Nchw => Array4::<f32>::zeros((1, 3, height, width)),
            TensorLayout::Nhwc => Array4::<f32>::zeros((1, height, width, 3)),
        };

        for (x, y, pixel) in resized.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..3 {
                // Normalize to [0, 1]
                let value = pixel[c] as f32 / 255.0;
                match self.layout {
                    TensorLayout::Nchw => tensor[[0, c, y, x]] = value,
                    TensorLayout::Nhwc => tensor[[0, y, x, c]] = value,
                }
            }
        }

        Ok(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_nchw_shape_and_values() {
        let frame = RgbImage::from_pixel(8, 4, Rgb([255, 0, 51]));
        let tensor = Preprocessor::new(8, 4, TensorLayout::Nchw)
            .preprocess(&frame)
            .unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 4, 8]);
        assert_eq!(tensor[[0, 0, 2, 5]], 1.0);
        assert_eq!(tensor[[0, 1, 2, 5]], 0.0);
        assert!((tensor[[0, 2, 2, 5]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_nhwc_resizes() {
        let frame = RgbImage::from_pixel(64, 48, Rgb([0, 255, 0]));
        let tensor = Preprocessor::new(16, 16, TensorLayout::Nhwc)
            .preprocess(&frame)
            .unwrap();
        assert_eq!(tensor.shape(), &[1, 16, 16, 3]);
        assert_eq!(tensor[[0, 7, 9, 1]], 1.0);
        assert_eq!(tensor[[0, 7, 9, 0]], 0.0);
    }

    #[test]
    fn test_empty_frame_is_rejected() {
        let preprocessor = Preprocessor::new(16, 16, TensorLayout::Nhwc);
        assert!(preprocessor.preprocess(&RgbImage::new(0, 0)).is_err());
    }
}
