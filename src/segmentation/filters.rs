use super::types::Mask;
use image::{Luma, Rgb, RgbImage};

/// Sampled 1D Gaussian kernel for an odd kernel size, normalized to sum 1
///
/// Sigma follows the usual derivation from the kernel size:
/// 0.3 * ((size - 1) * 0.5 - 1) + 0.8
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1) | 1;
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let radius = (size / 2) as i32;

    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Mirror an out-of-range index back into [0, len) without repeating the edge
fn reflect_101(mut i: i64, len: i64) -> usize {
    if len <= 1 {
        return 0;
    }
    while i < 0 || i >= len {
        if i < 0 {
            i = -i;
        }
        if i >= len {
            i = 2 * len - 2 - i;
        }
    }
    i as usize
}

/// Separable Gaussian blur with a square `size` x `size` kernel
pub fn gaussian_blur(frame: &RgbImage, size: u32) -> RgbImage {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return frame.clone();
    }

    let kernel = gaussian_kernel(size);
    let radius = (kernel.len() / 2) as i64;
    let (w, h) = (width as usize, height as usize);

    // Horizontal pass into a float buffer
    let mut horizontal = vec![[0f32; 3]; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0f32; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let sx = reflect_101(x as i64 + k as i64 - radius, w as i64);
                let p = frame.get_pixel(sx as u32, y as u32);
                for c in 0..3 {
                    acc[c] += p[c] as f32 * weight;
                }
            }
            horizontal[y * w + x] = acc;
        }
    }

    // Vertical pass back to bytes
    RgbImage::from_fn(width, height, |x, y| {
        let mut acc = [0f32; 3];
        for (k, weight) in kernel.iter().enumerate() {
            let sy = reflect_101(y as i64 + k as i64 - radius, h as i64);
            let p = horizontal[sy * w + x as usize];
            for c in 0..3 {
                acc[c] += p[c] * weight;
            }
        }
        Rgb([
            acc[0].round().clamp(0.0, 255.0) as u8,
            acc[1].round().clamp(0.0, 255.0) as u8,
            acc[2].round().clamp(0.0, 255.0) as u8,
        ])
    })
}

/// Rank filter over a square window; pixels outside the mask are ignored
fn rank_filter(mask: &Mask, size: u32, pick: fn(u8, u8) -> u8) -> Mask {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return mask.clone();
    }

    let radius = (size / 2) as i64;
    let (w, h) = (width as i64, height as i64);

    let horizontal = Mask::from_fn(width, height, |x, y| {
        let lo = (x as i64 - radius).max(0);
        let hi = (x as i64 + radius).min(w - 1);
        let mut value = mask.get_pixel(lo as u32, y)[0];
        for sx in lo + 1..=hi {
            value = pick(value, mask.get_pixel(sx as u32, y)[0]);
        }
        Luma([value])
    });

    Mask::from_fn(width, height, |x, y| {
        let lo = (y as i64 - radius).max(0);
        let hi = (y as i64 + radius).min(h - 1);
        let mut value = horizontal.get_pixel(x, lo as u32)[0];
        for sy in lo + 1..=hi {
            value = pick(value, horizontal.get_pixel(x, sy as u32)[0]);
        }
        Luma([value])
    })
}

pub fn erode(mask: &Mask, size: u32) -> Mask {
    rank_filter(mask, size, u8::min)
}

pub fn dilate(mask: &Mask, size: u32) -> Mask {
    rank_filter(mask, size, u8::max)
}

/// Erode then dilate: removes specks smaller than the kernel
pub fn open(mask: &Mask, size: u32) -> Mask {
    dilate(&erode(mask, size), size)
}

/// Dilate then erode: fills holes smaller than the kernel
pub fn close(mask: &Mask, size: u32) -> Mask {
    erode(&dilate(mask, size), size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_mask(size: u32, x0: u32, y0: u32, side: u32) -> Mask {
        Mask::from_fn(size, size, |x, y| {
            if x >= x0 && x < x0 + side && y >= y0 && y < y0 + side {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    fn count_on(mask: &Mask) -> usize {
        mask.pixels().filter(|p| p[0] == 255).count()
    }

    #[test]
    fn test_kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(7);
        assert_eq!(kernel.len(), 7);
        assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        for i in 0..3 {
            assert!((kernel[i] - kernel[6 - i]).abs() < 1e-7);
        }
        assert!(kernel[3] > kernel[2]);
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 1), 0);
    }

    #[test]
    fn test_blur_keeps_uniform_frame() {
        let frame = RgbImage::from_pixel(9, 6, Rgb([200, 150, 120]));
        let blurred = gaussian_blur(&frame, 7);
        assert!(blurred.pixels().all(|p| *p == Rgb([200, 150, 120])));
    }

    #[test]
    fn test_open_removes_speck() {
        let mut mask = square_mask(40, 10, 10, 15);
        mask.put_pixel(35, 35, Luma([255]));
        mask.put_pixel(36, 35, Luma([255]));
        let opened = open(&mask, 5);
        assert_eq!(opened.get_pixel(35, 35)[0], 0);
        assert_eq!(count_on(&opened), 15 * 15);
    }

    #[test]
    fn test_close_fills_small_hole() {
        let mut mask = square_mask(40, 10, 10, 15);
        mask.put_pixel(17, 17, Luma([0]));
        mask.put_pixel(18, 17, Luma([0]));
        let closed = close(&mask, 5);
        assert_eq!(closed.get_pixel(17, 17)[0], 255);
        assert_eq!(count_on(&closed), 15 * 15);
    }

    #[test]
    fn test_empty_images_pass_through() {
        assert_eq!(gaussian_blur(&RgbImage::new(0, 0), 7).dimensions(), (0, 0));
        assert_eq!(open(&Mask::new(0, 3), 5).dimensions(), (0, 3));
    }
}
