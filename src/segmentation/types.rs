use image::{GrayImage, ImageBuffer, Rgb};
use serde::Serialize;

/// Binary hand/background mask: 255 = hand, 0 = background
/// Dimensions match the input frame dimensions
pub type Mask = GrayImage;

/// Image whose three channels hold hue, saturation and value (8-bit convention)
pub type HsvImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Largest hue value in the 8-bit convention (degrees / 2)
pub const HUE_MAX: u8 = 180;

/// Mean HSV over a sampled region, kept in floating point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HsvMean {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

/// Inclusive lower/upper bounds in HSV space used to threshold skin pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl Default for ColorRange {
    fn default() -> Self {
        Self {
            lower: [0, 20, 70],
            upper: [20, 255, 255],
        }
    }
}

impl ColorRange {
    /// Hue tolerance either side of the sampled mean
    pub const HUE_TOLERANCE: f64 = 30.0;
    /// Saturation tolerance below the sampled mean
    pub const SATURATION_TOLERANCE: f64 = 30.0;
    /// Value tolerance below the sampled mean
    pub const VALUE_TOLERANCE: f64 = 60.0;
    /// Saturation floor of a calibrated range
    pub const SATURATION_FLOOR: f64 = 5.0;
    /// Value floor of a calibrated range
    pub const VALUE_FLOOR: f64 = 40.0;

    /// Build a range, swapping any channel whose bounds are inverted and
    /// clipping hue to [0, 180]
    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        let mut lower = lower;
        let mut upper = upper;
        lower[0] = lower[0].min(HUE_MAX);
        upper[0] = upper[0].min(HUE_MAX);
        for c in 0..3 {
            if lower[c] > upper[c] {
                std::mem::swap(&mut lower[c], &mut upper[c]);
            }
        }
        Self { lower, upper }
    }

    /// Derive a loose skin range around a sampled mean colour.
    ///
    /// The band is intentionally wide: hue ±30, saturation and value open
    /// upwards to 255, with floors that keep dark or washed-out skin inside.
    pub fn from_sample(mean: HsvMean) -> Self {
        let hue_max = HUE_MAX as f64;
        let h = mean.h.clamp(0.0, hue_max);
        let s = mean.s.clamp(0.0, 255.0);
        let v = mean.v.clamp(0.0, 255.0);

        let lower = [
            (h - Self::HUE_TOLERANCE).max(0.0),
            (s - Self::SATURATION_TOLERANCE).max(Self::SATURATION_FLOOR),
            (v - Self::VALUE_TOLERANCE).max(Self::VALUE_FLOOR),
        ];
        let upper = [(h + Self::HUE_TOLERANCE).min(hue_max), 255.0, 255.0];

        // Truncation matches an 8-bit cast of the derived bounds
        Self::new(
            [lower[0] as u8, lower[1] as u8, lower[2] as u8],
            [upper[0] as u8, upper[1] as u8, upper[2] as u8],
        )
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }
}
