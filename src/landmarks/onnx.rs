use super::preprocess::{Preprocessor, TensorLayout};
use super::{landmarks_from_model_output, HandLandmarks, LandmarkDetector};
use anyhow::{Context, Result};
use image::RgbImage;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::TensorRef;
use std::path::Path;

/// Single-hand landmark model run through ONNX Runtime
///
/// Expects the common hand landmark export: an NHWC float input in [0, 1]
/// and three outputs, in order:
/// - 63 floats, (x, y, z) per landmark in input pixels
/// - hand presence score
/// - handedness score (> 0.5 means the detector sees a right hand)
pub struct OnnxHandLandmarker {
    session: Session,
    preprocessor: Preprocessor,

    // Below this presence score the frame has no hand
    presence_threshold: f32,
}

impl OnnxHandLandmarker {
    /// Create a new landmarker from an ONNX file
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    ///
    /// # Default Configuration
    /// - Input size: 224x224 NHWC
    /// - Presence threshold: 0.7
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let path = model_path.as_ref();

        tracing::info!("Loading hand landmark model from {}", path.display());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        tracing::info!("Hand landmark model loaded successfully");

        Ok(Self {
            session,
            preprocessor: Preprocessor::new(224, 224, TensorLayout::Nhwc),
            presence_threshold: 0.7,
        })
    }

    pub fn with_presence_threshold(mut self, threshold: f32) -> Self {
        self.presence_threshold = threshold;
        self
    }
}

impl LandmarkDetector for OnnxHandLandmarker {
    fn detect(&mut self, frame: &RgbImage) -> Result<Option<HandLandmarks>> {
        let _span = tracing::debug_span!("landmark_detect").entered();

        let input_tensor = self.preprocessor.preprocess(frame)?;

        // Run inference
        let _infer_span = tracing::debug_span!("inference").entered();
        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input_tensor.view())?])
            .context("Failed to run inference")?;
        drop(_infer_span);

        let (_, coords) = outputs[0].try_extract_tensor::<f32>()?;
        let (_, presence) = outputs[1].try_extract_tensor::<f32>()?;
        let (_, handedness) = outputs[2].try_extract_tensor::<f32>()?;

        let score = presence.first().copied().unwrap_or(0.0);
        if score < self.presence_threshold {
            tracing::debug!("Hand presence {:.2} below threshold", score);
            return Ok(None);
        }

        let (width, height) = self.preprocessor.target_size();
        let Some(landmarks) = landmarks_from_model_output(coords, width, height) else {
            anyhow::bail!("Model returned {} coordinates, expected 63", coords.len());
        };

        let handedness = if handedness.first().copied().unwrap_or(0.0) > 0.5 {
            "Right"
        } else {
            "Left"
        };

        Ok(Some(HandLandmarks {
            landmarks,
            handedness: handedness.to_string(),
            score,
        }))
    }

    fn input_size(&self) -> (u32, u32) {
        self.preprocessor.target_size()
    }
}
