//! Automatic skin-colour calibration.
//!
//! IDLE -> PREPARE (countdown while the user places a hand in the box) ->
//! SAMPLING (average the box colour over several frames) -> IDLE with a new
//! `ColorRange`. The machine only moves forward; a new calibrate command
//! restarts it from PREPARE and an abort drops everything collected.

use image::{imageops, RgbImage};
use tracing::info;

use crate::events::{EventLog, Severity};
use crate::segmentation::{mean_hsv, to_hsv, ColorRange, HsvMean};

pub const PREPARE_FRAMES: u32 = 60;
pub const SAMPLE_FRAMES: u32 = 60;
/// Edge length of the square sampling box centred on the frame
pub const ROI_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalibrationStep {
    Idle,
    Prepare,
    Sampling,
}

/// What one frame did to the calibration session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationUpdate {
    /// No session is running; the frame is free for detection
    Idle,
    /// Still counting down before sampling
    Preparing { remaining: u32 },
    /// Running mean over the frames sampled so far
    Sampling { mean: HsvMean, sampled: u32 },
    /// Session finished with a new range
    Complete { range: ColorRange, mean: HsvMean },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationConfig {
    pub prepare_frames: u32,
    pub sample_frames: u32,
    pub roi_size: u32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            prepare_frames: PREPARE_FRAMES,
            sample_frames: SAMPLE_FRAMES,
            roi_size: ROI_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalibrationStateMachine {
    config: CalibrationConfig,
    step: CalibrationStep,
    frame_counter: u32,
    color_sum: [f64; 3],
}

impl Default for CalibrationStateMachine {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}

impl CalibrationStateMachine {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            step: CalibrationStep::Idle,
            frame_counter: 0,
            color_sum: [0.0; 3],
        }
    }

    pub fn step(&self) -> CalibrationStep {
        self.step
    }

    pub fn is_active(&self) -> bool {
        self.step != CalibrationStep::Idle
    }

    /// Begin (or restart) a session at PREPARE
    pub fn start(&mut self, events: &mut EventLog) {
        if self.is_active() {
            info!("Restarting calibration from {:?}", self.step);
        }
        self.reset();
        self.step = CalibrationStep::Prepare;
        events.push(Severity::Warning, "PREPARE: Place hand in box...");
    }

    /// Drop any running session without touching the installed range.
    /// Returns whether a session was running.
    pub fn abort(&mut self) -> bool {
        let was_active = self.is_active();
        if was_active {
            info!("Calibration aborted during {:?}", self.step);
        }
        self.reset();
        was_active
    }

    fn reset(&mut self) {
        self.step = CalibrationStep::Idle;
        self.frame_counter = 0;
        self.color_sum = [0.0; 3];
    }

    fn running_mean(&self) -> HsvMean {
        if self.frame_counter == 0 {
            return HsvMean::default();
        }
        let n = self.frame_counter as f64;
        HsvMean {
            h: self.color_sum[0] / n,
            s: self.color_sum[1] / n,
            v: self.color_sum[2] / n,
        }
    }

    /// Feed one frame to the running session
    pub fn advance(&mut self, frame: &RgbImage, events: &mut EventLog) -> CalibrationUpdate {
        match self.step {
            CalibrationStep::Idle => CalibrationUpdate::Idle,
            CalibrationStep::Prepare => {
                self.frame_counter += 1;
                let remaining = self.config.prepare_frames.saturating_sub(self.frame_counter);
                if remaining == 0 {
                    self.step = CalibrationStep::Sampling;
                    self.frame_counter = 0;
                    events.push(Severity::Info, "SAMPLING COLOR NOW...");
                }
                CalibrationUpdate::Preparing { remaining }
            }
            CalibrationStep::Sampling if self.frame_counter >= self.config.sample_frames => {
                let mean = self.running_mean();
                let range = ColorRange::from_sample(mean);
                info!("Calibration complete: {:?} -> {:?}", mean, range);
                events.push(
                    Severity::Success,
                    format!(
                        "Calibrated! H:{} S:{} V:{}",
                        mean.h as i64, mean.s as i64, mean.v as i64
                    ),
                );
                self.reset();
                CalibrationUpdate::Complete { range, mean }
            }
            CalibrationStep::Sampling => {
                match mean_hsv(&to_hsv(&self.region_of_interest(frame))) {
                    Some(sample) => {
                        self.color_sum[0] += sample.h;
                        self.color_sum[1] += sample.s;
                        self.color_sum[2] += sample.v;
                        self.frame_counter += 1;
                    }
                    None => tracing::debug!("Empty sampling region, frame skipped"),
                }
                CalibrationUpdate::Sampling {
                    mean: self.running_mean(),
                    sampled: self.frame_counter,
                }
            }
        }
    }

    /// Square box centred on the frame, clipped to its bounds
    fn region_of_interest(&self, frame: &RgbImage) -> RgbImage {
        let (width, height) = frame.dimensions();
        let size = self.config.roi_size;
        let x = (width / 2).saturating_sub(size / 2);
        let y = (height / 2).saturating_sub(size / 2);
        let w = size.min(width - x);
        let h = size.min(height - y);
        imageops::crop_imm(frame, x, y, w, h).to_image()
    }
}
