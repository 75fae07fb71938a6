//! Classical detection: segment -> extract -> classify -> smooth -> skeleton.

use image::RgbImage;

use crate::contour::{ContourExtractor, HandRegion};
use crate::gesture::{Classification, Gesture, GestureClassifier};
use crate::segmentation::{ColorRange, ColorSegmenter};
use crate::skeleton::{synthesize, Landmark, LANDMARK_COUNT};
use crate::smoothing::PositionSmoother;

/// Everything the classical path measured about one hand
#[derive(Debug, Clone, PartialEq)]
pub struct HandObservation {
    pub gesture: Gesture,
    pub valleys: usize,
    pub area: f64,
    /// Normalized centroid
    pub centroid: (f32, f32),
    /// Normalized topmost point before smoothing
    pub raw_fingertip: (f32, f32),
    /// Normalized fingertip after smoothing
    pub fingertip: (f32, f32),
    pub skeleton: [Landmark; LANDMARK_COUNT],
}

/// The stateless stages of the classical strategy
///
/// Mutable state (colour range, smoothing) is owned by the caller and passed
/// in on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicPipeline {
    segmenter: ColorSegmenter,
    extractor: ContourExtractor,
    classifier: GestureClassifier,
}

impl ClassicPipeline {
    pub fn new(
        segmenter: ColorSegmenter,
        extractor: ContourExtractor,
        classifier: GestureClassifier,
    ) -> Self {
        Self {
            segmenter,
            extractor,
            classifier,
        }
    }

    /// Segment, extract and classify without touching any state
    pub fn detect(&self, frame: &RgbImage, range: &ColorRange) -> Option<(HandRegion, Classification)> {
        let mask = self.segmenter.segment(frame, range);
        let region = self.extractor.extract(&mask)?;
        let classification = self.classifier.classify(&region);
        Some((region, classification))
    }

    /// Full classical pass; `None` when no hand-sized region was found
    pub fn process(
        &self,
        frame: &RgbImage,
        range: &ColorRange,
        smoother: &mut PositionSmoother,
    ) -> Option<HandObservation> {
        let _span = tracing::debug_span!("classic_pipeline").entered();

        let (region, classification) = self.detect(frame, range)?;

        let raw_fingertip = region.fingertip_normalized();
        let fingertip = smoother.smooth(raw_fingertip.0, raw_fingertip.1);
        let centroid = region.centroid_normalized();

        tracing::debug!(
            "Hand area={:.0} valleys={} tip=({:.3}, {:.3})",
            region.area,
            classification.valleys,
            fingertip.0,
            fingertip.1
        );

        Some(HandObservation {
            gesture: classification.gesture,
            valleys: classification.valleys,
            area: region.area,
            centroid,
            raw_fingertip,
            fingertip,
            skeleton: synthesize(centroid, fingertip),
        })
    }
}
