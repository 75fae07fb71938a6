#[cfg(feature = "onnx")]
mod onnx;
mod preprocess;

#[cfg(feature = "onnx")]
pub use onnx::OnnxHandLandmarker;
pub use preprocess::{Preprocessor, TensorLayout};

use anyhow::Result;
use image::RgbImage;

use crate::skeleton::{Landmark, LANDMARK_COUNT};

/// One detected hand from the landmark model
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    /// 21 normalized joints in the standard hand landmark order
    pub landmarks: [Landmark; LANDMARK_COUNT],
    /// Detector's own handedness label ("Left" or "Right"), as seen by the camera
    pub handedness: String,
    /// Hand presence score (0.0 to 1.0)
    pub score: f32,
}

impl HandLandmarks {
    /// Handedness from the user's point of view
    ///
    /// The camera image is mirrored relative to the user, so a hand the
    /// detector calls "Right" is the user's left.
    pub fn user_handedness(&self) -> &'static str {
        if self.handedness.eq_ignore_ascii_case("right") {
            "LEFT"
        } else {
            "RIGHT"
        }
    }
}

/// Trait for hand landmark detectors
/// Allows swapping between different backends (ONNX models, remote services, test doubles)
pub trait LandmarkDetector {
    /// Detect at most one hand in a frame
    ///
    /// # Returns
    /// * `Ok(None)` when no hand is present
    fn detect(&mut self, frame: &RgbImage) -> Result<Option<HandLandmarks>>;

    /// Reset internal state (for detectors that track across frames)
    fn reset_state(&mut self) {
        // Default implementation: no-op for stateless detectors
    }

    /// Get the model's preferred input dimensions
    ///
    /// Returns (width, height)
    fn input_size(&self) -> (u32, u32);
}

/// Create the default landmark detector from an ONNX model file
#[cfg(feature = "onnx")]
pub fn create_default_detector(model_path: &str) -> Result<Box<dyn LandmarkDetector>> {
    let detector = OnnxHandLandmarker::new(model_path)?;
    Ok(Box::new(detector))
}

/// Convert a flat `[x, y, z] * 21` model output in input-pixel units into
/// normalized landmarks
///
/// z is scaled by the input width, following the usual landmark model
/// convention. Returns `None` when the output is too short.
pub fn landmarks_from_model_output(
    raw: &[f32],
    input_width: u32,
    input_height: u32,
) -> Option<[Landmark; LANDMARK_COUNT]> {
    if raw.len() < LANDMARK_COUNT * 3 || input_width == 0 || input_height == 0 {
        return None;
    }

    let (w, h) = (input_width as f32, input_height as f32);
    let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
    for (i, chunk) in raw.chunks_exact(3).take(LANDMARK_COUNT).enumerate() {
        landmarks[i] = Landmark::new(chunk[0] / w, chunk[1] / h, chunk[2] / w);
    }
    Some(landmarks)
}
