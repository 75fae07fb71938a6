//! Open-hand vs. gripping classification.
//!
//! The classical path counts "finger valleys": convexity defects whose angle
//! at the far point is at most 90°. The ML path compares the thumb tip and
//! index tip landmarks.

use serde::Serialize;
use tracing::debug;

use crate::contour::{convexity_defects, defect_angle, HandRegion, Point};
use crate::error::GeometryError;
use crate::skeleton::{Landmark, INDEX_TIP, THUMB_TIP};

/// Widest far-point angle, in degrees, that still counts as a finger valley
pub const MAX_VALLEY_ANGLE: f64 = 90.0;

/// Slack for floating point when comparing against the valley angle
const ANGLE_EPSILON: f64 = 1e-9;

/// Thumb-to-index distance below which the ML path reports a grip
pub const PINCH_DISTANCE: f32 = 0.08;

/// Recognized hand state for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gesture {
    #[serde(rename = "OPEN HAND")]
    OpenHand,
    #[serde(rename = "GRIPPING")]
    Gripping,
    /// No qualifying hand region this frame
    #[serde(rename = "NONE")]
    NoHand,
}

impl Gesture {
    /// String representation used in records and log messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenHand => "OPEN HAND",
            Self::Gripping => "GRIPPING",
            Self::NoHand => "NONE",
        }
    }
}

impl std::fmt::Display for Gesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one hand region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub gesture: Gesture,
    /// Finger valleys counted, zero when the defect geometry was degenerate
    pub valleys: usize,
}

/// Defect-counting classifier for the classical path
#[derive(Debug, Clone, Copy)]
pub struct GestureClassifier {
    max_valley_angle: f64,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(MAX_VALLEY_ANGLE)
    }
}

impl GestureClassifier {
    pub fn new(max_valley_angle: f64) -> Self {
        Self { max_valley_angle }
    }

    /// Number of defects whose far-point angle is within the valley limit
    ///
    /// Any degenerate defect fails the whole count so callers can decide how
    /// to degrade.
    pub fn count_valleys(&self, contour: &[Point], hull: &[usize]) -> Result<usize, GeometryError> {
        let defects = convexity_defects(contour, hull)?;
        let mut valleys = 0;
        for defect in &defects {
            if defect_angle(defect)? <= self.max_valley_angle + ANGLE_EPSILON {
                valleys += 1;
            }
        }
        Ok(valleys)
    }

    /// Gripping for at most one valley, open hand otherwise
    pub fn classify(&self, region: &HandRegion) -> Classification {
        let valleys = match self.count_valleys(&region.contour, &region.hull) {
            Ok(valleys) => valleys,
            Err(e) => {
                debug!("Defect measurement failed, counting zero valleys: {}", e);
                0
            }
        };

        Classification {
            gesture: gesture_for_valleys(valleys),
            valleys,
        }
    }
}

pub fn gesture_for_valleys(valleys: usize) -> Gesture {
    if valleys <= 1 {
        Gesture::Gripping
    } else {
        Gesture::OpenHand
    }
}

/// ML-path rule: thumb tip close to index tip means a grip
pub fn classify_landmarks(landmarks: &[Landmark]) -> Gesture {
    match (landmarks.get(THUMB_TIP), landmarks.get(INDEX_TIP)) {
        (Some(thumb), Some(index)) if thumb.distance(index) < PINCH_DISTANCE => Gesture::Gripping,
        (Some(_), Some(_)) => Gesture::OpenHand,
        _ => Gesture::NoHand,
    }
}
