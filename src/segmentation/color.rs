use super::types::{HsvImage, HsvMean, HUE_MAX};
use image::{Rgb, RgbImage};

/// Convert one RGB pixel to 8-bit HSV
///
/// Hue is stored as degrees / 2 so it fits a byte (0-180), saturation and
/// value span 0-255.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    [
        (h / 2.0).round().clamp(0.0, HUE_MAX as f32) as u8,
        s.round().clamp(0.0, 255.0) as u8,
        max as u8,
    ]
}

/// Convert a whole frame to HSV
pub fn to_hsv(frame: &RgbImage) -> HsvImage {
    let (width, height) = frame.dimensions();
    HsvImage::from_fn(width, height, |x, y| {
        let p = frame.get_pixel(x, y);
        Rgb(rgb_to_hsv(p[0], p[1], p[2]))
    })
}

/// Mean HSV over every pixel of an image, `None` when the image is empty
pub fn mean_hsv(hsv: &HsvImage) -> Option<HsvMean> {
    let count = hsv.width() as u64 * hsv.height() as u64;
    if count == 0 {
        return None;
    }

    let mut sum = [0u64; 3];
    for pixel in hsv.pixels() {
        for c in 0..3 {
            sum[c] += pixel[c] as u64;
        }
    }

    let n = count as f64;
    Some(HsvMean {
        h: sum[0] as f64 / n,
        s: sum[1] as f64 / n,
        v: sum[2] as f64 / n,
    })
}
