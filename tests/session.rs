use std::cell::Cell;
use std::collections::VecDeque;
use std::io::Cursor;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use gesturecam::landmarks::{HandLandmarks, LandmarkDetector};
use gesturecam::segmentation::ColorRange;
use gesturecam::session::GestureLabel;
use gesturecam::skeleton::{Landmark, INDEX_TIP, LANDMARK_COUNT, THUMB_TIP};
use gesturecam::{
    Command, EventLog, Gesture, GestureRecord, Mode, Session, SessionConfig, Severity, Strategy,
};
use image::{ImageFormat, Rgb, RgbImage};

const SKIN: Rgb<u8> = Rgb([200, 150, 120]);
const BACKDROP: Rgb<u8> = Rgb([30, 60, 200]);

fn fist_frame() -> RgbImage {
    RgbImage::from_fn(320, 240, |x, y| {
        if (110..210).contains(&x) && (70..170).contains(&y) {
            SKIN
        } else {
            BACKDROP
        }
    })
}

fn empty_frame() -> RgbImage {
    RgbImage::from_pixel(320, 240, BACKDROP)
}

fn hand(pinch: f32, handedness: &str) -> HandLandmarks {
    let mut landmarks = [Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
    landmarks[INDEX_TIP] = Landmark::new(0.4, 0.3, -0.02);
    landmarks[THUMB_TIP] = Landmark::new(0.4 + pinch, 0.3, -0.02);
    HandLandmarks {
        landmarks,
        handedness: handedness.to_string(),
        score: 0.9,
    }
}

/// Replays scripted detections and counts resets
struct ScriptedDetector {
    script: VecDeque<Result<Option<HandLandmarks>>>,
    resets: Rc<Cell<u32>>,
}

impl ScriptedDetector {
    fn boxed(
        script: Vec<Result<Option<HandLandmarks>>>,
    ) -> (Box<dyn LandmarkDetector>, Rc<Cell<u32>>) {
        let resets = Rc::new(Cell::new(0));
        let detector = Self {
            script: script.into(),
            resets: Rc::clone(&resets),
        };
        (Box::new(detector), resets)
    }
}

impl LandmarkDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &RgbImage) -> Result<Option<HandLandmarks>> {
        self.script.pop_front().unwrap_or(Ok(None))
    }

    fn reset_state(&mut self) {
        self.resets.set(self.resets.get() + 1);
    }

    fn input_size(&self) -> (u32, u32) {
        (224, 224)
    }
}

fn status(record: &GestureRecord) -> &str {
    match &record.gesture {
        GestureLabel::Status(text) => text,
        GestureLabel::Gesture(g) => g.as_str(),
    }
}

#[test]
fn calibration_runs_121_frames_then_switches_to_classical() {
    let mut session = Session::default();
    let mut events = EventLog::new();
    session.greet(&mut events);
    session.apply_command(Command::Calibrate, &mut events);

    let frame = fist_frame();
    let records: Vec<GestureRecord> = (0..121)
        .map(|_| session.process_frame(&frame, &mut events))
        .collect();

    assert_eq!(status(&records[0]), "PLACE HAND IN BOX (59)");
    assert_eq!(status(&records[59]), "PLACE HAND IN BOX (0)");
    assert!(records[..60].iter().all(|r| r.mode == Mode::CalibratingWait));

    assert!(records[60..120]
        .iter()
        .all(|r| r.mode == Mode::CalibratingScan && status(r) == "SAMPLING..."));

    assert_eq!(status(&records[120]), "CALIBRATED");
    assert_eq!(records[120].mode, Mode::Manual);
    assert!(records.iter().all(|r| r.confidence == 0 && r.landmarks.is_empty()));

    assert_eq!(session.strategy(), Strategy::Classical);
    assert_eq!(
        *session.color_range(),
        ColorRange::new([0, 72, 140], [41, 255, 255])
    );

    let messages: Vec<(Severity, String)> = events
        .iter()
        .map(|e| (e.severity, e.message.clone()))
        .collect();
    assert_eq!(
        messages,
        vec![
            (Severity::System, "Backend Loaded. Ready.".to_string()),
            (Severity::Warning, "PREPARE: Place hand in box...".to_string()),
            (Severity::Info, "SAMPLING COLOR NOW...".to_string()),
            (Severity::Success, "Calibrated! H:11 S:102 V:200".to_string()),
        ]
    );

    // The new range still finds the hand
    let record = session.process_frame(&frame, &mut events);
    assert_eq!(record.gesture, GestureLabel::Gesture(Gesture::Gripping));
    assert_eq!(record.confidence, 80);
}

#[test]
fn calibration_can_keep_the_strategy() {
    let mut session = Session::new(SessionConfig {
        switch_to_classical_after_calibration: false,
        ..SessionConfig::default()
    });
    let mut events = EventLog::new();
    session.apply_command(Command::Calibrate, &mut events);

    let frame = fist_frame();
    let last = (0..121)
        .map(|_| session.process_frame(&frame, &mut events))
        .last()
        .unwrap();
    assert_eq!(last.mode, Mode::Ai);
    assert_eq!(session.strategy(), Strategy::Ml);
    assert_ne!(*session.color_range(), ColorRange::default());
}

#[test]
fn calibrate_again_restarts_the_countdown() {
    let mut session = Session::default();
    let mut events = EventLog::new();
    session.apply_command(Command::Calibrate, &mut events);
    for _ in 0..90 {
        session.process_frame(&fist_frame(), &mut events);
    }
    session.apply_command(Command::Calibrate, &mut events);
    let record = session.process_frame(&fist_frame(), &mut events);
    assert_eq!(status(&record), "PLACE HAND IN BOX (59)");
    assert_eq!(*session.color_range(), ColorRange::default());
}

#[test]
fn ml_strategy_reports_landmarks() {
    let (detector, _) = ScriptedDetector::boxed(vec![
        Ok(Some(hand(0.02, "Right"))),
        Ok(Some(hand(0.02, "Right"))),
        Ok(Some(hand(0.2, "Left"))),
        Ok(None),
        Err(anyhow!("inference failed")),
    ]);
    let mut session = Session::default().with_detector(detector);
    let mut events = EventLog::new();
    let frame = empty_frame();

    let grip = session.process_frame(&frame, &mut events);
    assert_eq!(grip.gesture, GestureLabel::Gesture(Gesture::Gripping));
    assert_eq!(grip.confidence, 95);
    assert_eq!(grip.handedness, "LEFT");
    assert_eq!(grip.mode, Mode::Ai);
    assert_eq!(grip.landmarks.len(), 21);
    assert_eq!(grip.finger_tip, Landmark::new(0.4, 0.3, -0.02));

    session.process_frame(&frame, &mut events);

    let open = session.process_frame(&frame, &mut events);
    assert_eq!(open.gesture, GestureLabel::Gesture(Gesture::OpenHand));
    assert_eq!(open.handedness, "RIGHT");

    assert_eq!(
        session.process_frame(&frame, &mut events),
        GestureRecord::no_hand(Mode::Ai)
    );
    assert_eq!(
        session.process_frame(&frame, &mut events),
        GestureRecord::no_hand(Mode::Ai)
    );

    assert_eq!(events.len(), 2);
    assert!(events.contains(Severity::Success, "AI Detect: GRIPPING"));
    assert!(events.contains(Severity::Neutral, "AI Detect: OPEN HAND"));
}

#[test]
fn switching_strategies() {
    let (detector, resets) = ScriptedDetector::boxed(Vec::new());
    let mut session = Session::new(SessionConfig {
        initial_strategy: Strategy::Classical,
        ..SessionConfig::default()
    })
    .with_detector(detector);
    let mut events = EventLog::new();

    session.apply_command("MODE:AI".parse().unwrap(), &mut events);
    assert_eq!(session.strategy(), Strategy::Ml);
    assert_eq!(resets.get(), 1);
    assert!(events.contains(Severity::System, "SWITCHED TO AI MODE"));

    // Already there: announced again, no reset
    session.apply_command(Command::Switch(Strategy::Ml), &mut events);
    assert_eq!(resets.get(), 1);

    session.apply_command("MODE:MANUAL".parse().unwrap(), &mut events);
    let record = session.process_frame(&fist_frame(), &mut events);
    assert_eq!(record.mode, Mode::Manual);
    assert_eq!(record.gesture, GestureLabel::Gesture(Gesture::Gripping));
    assert!(events.contains(Severity::System, "SWITCHED TO MANUAL MODE"));
    assert!(events.iter().any(|e| e.message == "Gesture: GRIPPING (Defects: 0)"
        || e.message == "Gesture: GRIPPING (Defects: 1)"));
}

#[test]
fn switch_during_calibration_keeps_the_old_range() {
    let mut session = Session::default();
    let mut events = EventLog::new();
    session.apply_command(Command::Calibrate, &mut events);
    for _ in 0..100 {
        session.process_frame(&fist_frame(), &mut events);
    }
    session.apply_command(Command::Switch(Strategy::Classical), &mut events);

    assert_eq!(session.mode(), Mode::Manual);
    assert_eq!(*session.color_range(), ColorRange::default());
    assert!(!events.iter().any(|e| e.severity == Severity::Success));
}

#[test]
fn encoded_frames() {
    let mut session = Session::new(SessionConfig {
        initial_strategy: Strategy::Classical,
        ..SessionConfig::default()
    });
    let mut events = EventLog::new();

    let mut png = Vec::new();
    fist_frame()
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();

    let record = session.process_encoded(&png, &mut events).unwrap();
    assert_eq!(record.gesture, GestureLabel::Gesture(Gesture::Gripping));

    assert!(session.process_encoded(&png[..16], &mut events).is_none());
    assert!(session.process_encoded(b"", &mut events).is_none());
}

#[test]
fn sessions_are_isolated() {
    let mut calibrated = Session::default();
    let untouched = Session::default();
    let mut events = EventLog::new();

    calibrated.apply_command(Command::Calibrate, &mut events);
    for _ in 0..121 {
        calibrated.process_frame(&fist_frame(), &mut events);
    }

    assert_ne!(calibrated.color_range(), untouched.color_range());
    assert_eq!(*untouched.color_range(), ColorRange::default());
    assert_eq!(untouched.mode(), Mode::Ai);
}

#[test]
fn records_serialize_as_camel_case() {
    let mut session = Session::new(SessionConfig {
        initial_strategy: Strategy::Classical,
        ..SessionConfig::default()
    });
    let mut events = EventLog::new();
    let record = session.process_frame(&fist_frame(), &mut events);

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["gesture"], "GRIPPING");
    assert_eq!(json["confidence"], 80);
    assert_eq!(json["handedness"], "MANUAL");
    assert_eq!(json["mode"], "MANUAL");
    assert_eq!(json["landmarks"].as_array().unwrap().len(), 21);
    assert_eq!(json["fingerTip"]["z"], 0.0);
}
