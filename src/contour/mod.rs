mod geometry;
mod trace;

pub use geometry::{
    contour_area, convex_hull, convexity_defects, defect_angle, moments, Contour, ConvexityDefect,
    Moments, Point,
};
pub use trace::find_contours;

use crate::segmentation::Mask;

/// Regions at or below this many square pixels are treated as noise
pub const MIN_HAND_AREA: f64 = 2000.0;

/// The dominant hand-shaped region of a mask and its landmarks
#[derive(Debug, Clone, PartialEq)]
pub struct HandRegion {
    pub contour: Contour,
    /// Hull vertices as ascending indices into `contour`
    pub hull: Vec<usize>,
    pub area: f64,
    /// Centroid in pixels, `(0, 0)` for a degenerate region
    pub centroid: Point,
    /// Topmost contour point in pixels
    pub fingertip: Point,
    pub frame_size: (u32, u32),
}

impl HandRegion {
    /// Fingertip divided by frame width and height
    pub fn fingertip_normalized(&self) -> (f32, f32) {
        normalize(self.fingertip, self.frame_size)
    }

    /// Centroid divided by frame width and height
    pub fn centroid_normalized(&self) -> (f32, f32) {
        normalize(self.centroid, self.frame_size)
    }
}

fn normalize(p: Point, (width, height): (u32, u32)) -> (f32, f32) {
    if width == 0 || height == 0 {
        return (0.0, 0.0);
    }
    (p.x as f32 / width as f32, p.y as f32 / height as f32)
}

/// Finds the largest region in a mask and measures it
#[derive(Debug, Clone, Copy)]
pub struct ContourExtractor {
    min_area: f64,
}

impl Default for ContourExtractor {
    fn default() -> Self {
        Self::new(MIN_HAND_AREA)
    }
}

impl ContourExtractor {
    pub fn new(min_area: f64) -> Self {
        Self { min_area }
    }

    /// The largest region when its area exceeds the minimum, otherwise `None`
    pub fn extract(&self, mask: &Mask) -> Option<HandRegion> {
        let _span = tracing::debug_span!("extract_contour").entered();

        let contours = find_contours(mask);
        tracing::debug!("Found {} contours", contours.len());

        let (contour, area) = contours
            .into_iter()
            .map(|c| {
                let area = contour_area(&c);
                (c, area)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))?;

        if area <= self.min_area {
            tracing::debug!("Largest region {:.0}px² is below threshold", area);
            return None;
        }

        let hull = convex_hull(&contour);
        let centroid = moments(&contour).centroid();
        let fingertip = topmost(&contour);

        Some(HandRegion {
            contour,
            hull,
            area,
            centroid,
            fingertip,
            frame_size: mask.dimensions(),
        })
    }
}

/// Point with the smallest y; the earliest one on ties
fn topmost(contour: &[Point]) -> Point {
    contour
        .iter()
        .copied()
        .reduce(|best, p| if p.y < best.y { p } else { best })
        .unwrap_or_default()
}
