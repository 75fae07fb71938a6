//! Per-connection session context.
//!
//! A `Session` owns every piece of mutable state one client needs (colour
//! range, fingertip smoothing, calibration progress, active strategy and the
//! last reported gesture) and turns frames into `GestureRecord`s. Sessions
//! share nothing, so any number can run side by side.

mod command;
mod record;

pub use command::{Command, Strategy};
pub use record::{
    GestureLabel, GestureRecord, Mode, CLASSICAL_CONFIDENCE, CLASSICAL_HANDEDNESS, ML_CONFIDENCE,
    UNKNOWN_HANDEDNESS,
};

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::calibration::{CalibrationConfig, CalibrationStateMachine, CalibrationStep, CalibrationUpdate};
use crate::capture::decode_frame;
use crate::contour::{ContourExtractor, MIN_HAND_AREA};
use crate::events::{EventLog, Severity};
use crate::gesture::{classify_landmarks, Gesture, GestureClassifier, MAX_VALLEY_ANGLE};
use crate::landmarks::LandmarkDetector;
use crate::pipeline::ClassicPipeline;
use crate::segmentation::{ColorRange, ColorSegmenter, BLUR_KERNEL, MORPH_KERNEL};
use crate::skeleton::{Landmark, INDEX_TIP};
use crate::smoothing::{PositionSmoother, DEFAULT_SMOOTHING_FACTOR};

/// Status shown on the frame that finishes a calibration
pub const CALIBRATED_STATUS: &str = "CALIBRATED";
/// Status shown while sampling skin colour
pub const SAMPLING_STATUS: &str = "SAMPLING...";

/// Tunables for one session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub smoothing_factor: f32,
    pub min_hand_area: f64,
    /// Degrees
    pub max_valley_angle: f64,
    pub blur_kernel: u32,
    pub morph_kernel: u32,
    pub calibration: CalibrationConfig,
    /// Range used until the first calibration completes
    pub color_range: ColorRange,
    pub initial_strategy: Strategy,
    pub switch_to_classical_after_calibration: bool,
    pub ml_confidence: u8,
    pub classical_confidence: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            min_hand_area: MIN_HAND_AREA,
            max_valley_angle: MAX_VALLEY_ANGLE,
            blur_kernel: BLUR_KERNEL,
            morph_kernel: MORPH_KERNEL,
            calibration: CalibrationConfig::default(),
            color_range: ColorRange::default(),
            initial_strategy: Strategy::Ml,
            switch_to_classical_after_calibration: true,
            ml_confidence: ML_CONFIDENCE,
            classical_confidence: CLASSICAL_CONFIDENCE,
        }
    }
}

pub struct Session {
    config: SessionConfig,
    pipeline: ClassicPipeline,
    color_range: ColorRange,
    smoother: PositionSmoother,
    calibration: CalibrationStateMachine,
    strategy: Strategy,
    detector: Option<Box<dyn LandmarkDetector>>,
    last_gesture: Option<Gesture>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let pipeline = ClassicPipeline::new(
            ColorSegmenter::new(config.blur_kernel, config.morph_kernel),
            ContourExtractor::new(config.min_hand_area),
            GestureClassifier::new(config.max_valley_angle),
        );

        Self {
            pipeline,
            color_range: config.color_range,
            smoother: PositionSmoother::new(config.smoothing_factor),
            calibration: CalibrationStateMachine::new(config.calibration),
            strategy: config.initial_strategy,
            detector: None,
            last_gesture: None,
            config,
        }
    }

    /// Attach the landmark detector used by the ML strategy
    pub fn with_detector(mut self, detector: Box<dyn LandmarkDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn greet(&self, events: &mut EventLog) {
        events.push(Severity::System, "Backend Loaded. Ready.");
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn color_range(&self) -> &ColorRange {
        &self.color_range
    }

    pub fn calibration_step(&self) -> CalibrationStep {
        self.calibration.step()
    }

    /// Mode a record produced right now would carry
    pub fn mode(&self) -> Mode {
        match self.calibration.step() {
            CalibrationStep::Idle => self.strategy.into(),
            CalibrationStep::Prepare => Mode::CalibratingWait,
            CalibrationStep::Sampling => Mode::CalibratingScan,
        }
    }

    pub fn apply_command(&mut self, command: Command, events: &mut EventLog) {
        match command {
            Command::Calibrate => self.calibration.start(events),
            Command::Switch(strategy) => {
                self.calibration.abort();
                self.set_strategy(strategy);
                events.push(Severity::System, format!("SWITCHED TO {} MODE", strategy));
            }
        }
    }

    fn set_strategy(&mut self, strategy: Strategy) {
        if strategy != self.strategy {
            info!("Strategy {} -> {}", self.strategy, strategy);
            self.last_gesture = None;
            if strategy == Strategy::Ml {
                if let Some(detector) = self.detector.as_mut() {
                    detector.reset_state();
                }
            }
        }
        self.strategy = strategy;
    }

    /// Decode an encoded image and process it; undecodable input yields no record
    pub fn process_encoded(&mut self, bytes: &[u8], events: &mut EventLog) -> Option<GestureRecord> {
        match decode_frame(bytes) {
            Ok(frame) => Some(self.process_frame(&frame, events)),
            Err(e) => {
                debug!("Skipping undecodable frame: {}", e);
                None
            }
        }
    }

    /// Process one frame with whatever the session is currently doing
    pub fn process_frame(&mut self, frame: &RgbImage, events: &mut EventLog) -> GestureRecord {
        if self.calibration.is_active() {
            return self.calibrate(frame, events);
        }

        match self.strategy {
            Strategy::Classical => self.process_classical(frame, events),
            Strategy::Ml => self.process_ml(frame, events),
        }
    }

    fn calibrate(&mut self, frame: &RgbImage, events: &mut EventLog) -> GestureRecord {
        match self.calibration.advance(frame, events) {
            CalibrationUpdate::Preparing { remaining } => GestureRecord::status(
                format!("PLACE HAND IN BOX ({})", remaining),
                Mode::CalibratingWait,
            ),
            CalibrationUpdate::Sampling { mean, sampled } => {
                debug!(
                    "Sampled {} frames, mean H:{:.1} S:{:.1} V:{:.1}",
                    sampled, mean.h, mean.s, mean.v
                );
                GestureRecord::status(SAMPLING_STATUS, Mode::CalibratingScan)
            }
            CalibrationUpdate::Complete { range, .. } => {
                self.color_range = range;
                if self.config.switch_to_classical_after_calibration {
                    self.set_strategy(Strategy::Classical);
                }
                GestureRecord::status(CALIBRATED_STATUS, self.mode())
            }
            // Not produced while a session is active
            CalibrationUpdate::Idle => GestureRecord::no_hand(self.mode()),
        }
    }

    fn process_classical(&mut self, frame: &RgbImage, events: &mut EventLog) -> GestureRecord {
        let Some(observation) = self.pipeline.process(frame, &self.color_range, &mut self.smoother)
        else {
            return GestureRecord::no_hand(Mode::Manual);
        };

        if self.last_gesture != Some(observation.gesture) {
            events.push(
                Severity::Info,
                format!(
                    "Gesture: {} (Defects: {})",
                    observation.gesture, observation.valleys
                ),
            );
            self.last_gesture = Some(observation.gesture);
        }

        GestureRecord {
            gesture: GestureLabel::Gesture(observation.gesture),
            confidence: self.config.classical_confidence,
            finger_tip: Landmark::planar(observation.fingertip.0, observation.fingertip.1),
            landmarks: observation.skeleton.to_vec(),
            handedness: CLASSICAL_HANDEDNESS.to_string(),
            mode: Mode::Manual,
        }
    }

    fn process_ml(&mut self, frame: &RgbImage, events: &mut EventLog) -> GestureRecord {
        let _span = tracing::debug_span!("ml_detect").entered();

        let Some(detector) = self.detector.as_mut() else {
            debug!("No landmark detector attached");
            return GestureRecord::no_hand(Mode::Ai);
        };

        let hand = match detector.detect(frame) {
            Ok(Some(hand)) => hand,
            Ok(None) => return GestureRecord::no_hand(Mode::Ai),
            Err(e) => {
                warn!("Landmark detection failed: {:#}", e);
                return GestureRecord::no_hand(Mode::Ai);
            }
        };

        let gesture = classify_landmarks(&hand.landmarks);
        if self.last_gesture != Some(gesture) {
            let severity = match gesture {
                Gesture::Gripping => Severity::Success,
                _ => Severity::Neutral,
            };
            events.push(severity, format!("AI Detect: {}", gesture));
            self.last_gesture = Some(gesture);
        }

        // Keep the classical smoother on the hand so a switch does not jump
        let tip = hand.landmarks[INDEX_TIP];
        self.smoother.reseed(tip.x, tip.y);

        GestureRecord {
            gesture: GestureLabel::Gesture(gesture),
            confidence: self.config.ml_confidence,
            finger_tip: tip,
            landmarks: hand.landmarks.to_vec(),
            handedness: hand.user_handedness().to_string(),
            mode: Mode::Ai,
        }
    }
}
