//! 21-landmark hand schema shared by both detection strategies.
//!
//! The classical pipeline only measures a centroid and a fingertip, so it
//! synthesizes a pseudo-skeleton in the same shape the landmark detector
//! produces. Consumers can then treat both outputs identically.

use serde::Serialize;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;

/// Normalized 3D point: x and y in 0.0-1.0 of the frame, z relative depth
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Point on the image plane, z = 0
    pub fn planar(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Expand a centroid and fingertip into the 21-landmark layout
///
/// Index 0 is the centroid, index 8 the fingertip, indices 5-7 sit at 1/4,
/// 2/4 and 3/4 of the way from centroid to fingertip, and every other index
/// repeats the centroid.
pub fn synthesize(centroid: (f32, f32), fingertip: (f32, f32)) -> [Landmark; LANDMARK_COUNT] {
    let (cx, cy) = centroid;
    let (fx, fy) = fingertip;

    let mut skeleton = [Landmark::planar(cx, cy); LANDMARK_COUNT];
    for index in INDEX_MCP..=INDEX_DIP {
        let ratio = (index - INDEX_MCP + 1) as f32 / 4.0;
        skeleton[index] = Landmark::planar(cx + (fx - cx) * ratio, cy + (fy - cy) * ratio);
    }
    skeleton[INDEX_TIP] = Landmark::planar(fx, fy);
    skeleton
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton_layout() {
        let centroid = (0.4, 0.7);
        let tip = (0.6, 0.1);
        let skeleton = synthesize(centroid, tip);

        assert_eq!(skeleton[WRIST], Landmark::planar(0.4, 0.7));
        assert_eq!(skeleton[INDEX_TIP], Landmark::planar(0.6, 0.1));

        for (index, ratio) in [(INDEX_MCP, 0.25f32), (INDEX_PIP, 0.5), (INDEX_DIP, 0.75)] {
            let expected = Landmark::planar(0.4 + (0.6 - 0.4) * ratio, 0.7 + (0.1 - 0.7) * ratio);
            assert_eq!(skeleton[index], expected, "landmark {}", index);
        }

        for index in (0..LANDMARK_COUNT).filter(|i| !(INDEX_MCP..=INDEX_TIP).contains(i)) {
            assert_eq!(skeleton[index], skeleton[WRIST], "landmark {}", index);
        }
        assert!(skeleton.iter().all(|l| l.z == 0.0));
    }

    #[test]
    fn test_coincident_points() {
        let skeleton = synthesize((0.5, 0.5), (0.5, 0.5));
        assert!(skeleton.iter().all(|l| *l == Landmark::planar(0.5, 0.5)));
    }

    #[test]
    fn test_distance() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(0.3, 0.4, 0.0);
        assert!((a.distance(&b) - 0.5).abs() < 1e-6);
    }
}
