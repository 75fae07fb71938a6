use serde::Serialize;

use super::command::Strategy;
use crate::gesture::Gesture;
use crate::skeleton::Landmark;

/// Confidence reported by the landmark detector path
pub const ML_CONFIDENCE: u8 = 95;
/// Confidence reported by the classical path
pub const CLASSICAL_CONFIDENCE: u8 = 80;
/// Handedness label when nothing is known
pub const UNKNOWN_HANDEDNESS: &str = "N/A";
/// Handedness label of the classical path, which cannot tell hands apart
pub const CLASSICAL_HANDEDNESS: &str = "MANUAL";

/// Active strategy or calibration phase, as shown to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Mode {
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "MANUAL")]
    Manual,
    #[serde(rename = "CALIBRATING_WAIT")]
    CalibratingWait,
    #[serde(rename = "CALIBRATING_SCAN")]
    CalibratingScan,
}

impl From<Strategy> for Mode {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Ml => Mode::Ai,
            Strategy::Classical => Mode::Manual,
        }
    }
}

/// Either a recognized gesture or a transient calibration status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GestureLabel {
    Gesture(Gesture),
    Status(String),
}

impl GestureLabel {
    pub fn gesture(&self) -> Option<Gesture> {
        match self {
            Self::Gesture(g) => Some(*g),
            Self::Status(_) => None,
        }
    }
}

/// Per-frame result, identical in shape for both strategies
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureRecord {
    pub gesture: GestureLabel,
    /// 0-100
    pub confidence: u8,
    /// Normalized tracked fingertip; z is 0 on the classical path
    pub finger_tip: Landmark,
    /// 21 landmarks, empty when no hand was found
    pub landmarks: Vec<Landmark>,
    pub handedness: String,
    pub mode: Mode,
}

impl GestureRecord {
    /// Record for a frame in which no hand was found
    pub fn no_hand(mode: Mode) -> Self {
        Self {
            gesture: GestureLabel::Gesture(Gesture::NoHand),
            confidence: 0,
            finger_tip: Landmark::default(),
            landmarks: Vec::new(),
            handedness: UNKNOWN_HANDEDNESS.to_string(),
            mode,
        }
    }

    /// Record carrying a calibration status instead of a gesture
    pub fn status(message: impl Into<String>, mode: Mode) -> Self {
        Self {
            gesture: GestureLabel::Status(message.into()),
            ..Self::no_hand(mode)
        }
    }
}
