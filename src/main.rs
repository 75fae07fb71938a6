use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gesturecam::capture::{CaptureSource, ImageSequence};
use gesturecam::output::{JsonLinesSink, RecordSink};
use gesturecam::{Command, EventLog, Session, SessionConfig, Strategy};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Give up when the source fails this many times in a row
const MAX_CONSECUTIVE_FAILURES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Landmark model
    Ai,
    /// Colour segmentation and contour geometry
    Manual,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Ai => Strategy::Ml,
            StrategyArg::Manual => Strategy::Classical,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image files or directories to replay as frames
    inputs: Vec<PathBuf>,

    /// Read frames from this webcam instead of image files
    #[cfg(feature = "camera")]
    #[arg(long)]
    camera: Option<u32>,

    /// Capture resolution width
    #[cfg(feature = "camera")]
    #[arg(long, default_value_t = 640)]
    capture_width: u32,

    /// Capture resolution height
    #[cfg(feature = "camera")]
    #[arg(long, default_value_t = 480)]
    capture_height: u32,

    /// Target frames per second (0 = as fast as possible)
    #[arg(long, default_value_t = 0)]
    fps: u32,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Detection strategy to start with
    #[arg(long, value_enum, default_value_t = StrategyArg::Manual)]
    strategy: StrategyArg,

    /// Run skin-colour calibration on the first frames
    #[arg(long)]
    calibrate: bool,

    /// Stay on the current strategy after calibration finishes
    #[arg(long)]
    no_auto_switch: bool,

    /// Fingertip smoothing factor, weight of the previous position
    #[arg(long, default_value_t = gesturecam::smoothing::DEFAULT_SMOOTHING_FACTOR)]
    smoothing: f32,

    /// Minimum hand contour area in pixels
    #[arg(long, default_value_t = gesturecam::contour::MIN_HAND_AREA)]
    min_area: f64,

    /// Write JSON lines here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to hand landmark model (ONNX file)
    #[cfg(feature = "onnx")]
    #[arg(long)]
    model: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout carries the records
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("gesturecam starting");
    tracing::info!("Strategy: {:?}, smoothing: {}", args.strategy, args.smoothing);

    let config = SessionConfig {
        smoothing_factor: args.smoothing,
        min_hand_area: args.min_area,
        initial_strategy: args.strategy.into(),
        switch_to_classical_after_calibration: !args.no_auto_switch,
        ..SessionConfig::default()
    };

    #[allow(unused_mut)]
    let mut session = Session::new(config);

    #[cfg(feature = "onnx")]
    if let Some(model_path) = &args.model {
        let detector = gesturecam::landmarks::create_default_detector(model_path)
            .context("Failed to load hand landmark model")?;
        session = session.with_detector(detector);
    } else {
        tracing::info!("No landmark model, AI strategy will report no hand");
    }

    let mut capture = open_capture(&args)?;

    match &args.output {
        Some(path) => {
            let mut sink = JsonLinesSink::create(path)?;
            run_pipeline(capture.as_mut(), &mut sink, session, &args)
        }
        None => {
            let mut sink = JsonLinesSink::stdout();
            run_pipeline(capture.as_mut(), &mut sink, session, &args)
        }
    }
}

fn open_capture(args: &Args) -> Result<Box<dyn CaptureSource>> {
    #[cfg(feature = "camera")]
    if let Some(index) = args.camera {
        let camera = gesturecam::capture::WebcamCapture::new(
            index,
            args.capture_width,
            args.capture_height,
            args.fps.max(1),
        )
        .context("Failed to initialize webcam capture")?;
        return Ok(Box::new(camera));
    }

    if args.inputs.is_empty() {
        anyhow::bail!("No input images given");
    }
    let images = ImageSequence::new(&args.inputs).context("Failed to open input images")?;
    Ok(Box::new(images))
}

fn run_pipeline<O>(
    capture: &mut dyn CaptureSource,
    output: &mut O,
    mut session: Session,
    args: &Args,
) -> Result<()>
where
    O: RecordSink,
{
    let frame_duration = (args.fps > 0).then(|| Duration::from_secs_f32(1.0 / args.fps as f32));
    let mut frame_count = 0u64;
    let mut skipped = 0u64;
    let mut consecutive_failures = 0u32;
    let mut total_capture_time = Duration::ZERO;
    let mut total_process_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;

    let mut events = EventLog::new();
    session.greet(&mut events);
    if args.calibrate {
        session.apply_command(Command::Calibrate, &mut events);
    }
    output.write_events(&events.drain())?;

    tracing::info!("Starting main pipeline loop");

    loop {
        if args.frames.is_some_and(|limit| frame_count >= limit) {
            break;
        }
        let loop_start = Instant::now();

        // Capture frame
        let capture_start = Instant::now();
        let frame = match capture.capture_frame() {
            Ok(Some(frame)) => {
                consecutive_failures = 0;
                frame
            }
            Ok(None) => break,
            Err(e) => {
                consecutive_failures += 1;
                if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                    return Err(e.context("Capture source keeps failing"));
                }
                // A bad frame is skipped, the stream goes on
                tracing::warn!("Skipping frame: {:#}", e);
                skipped += 1;
                continue;
            }
        };
        total_capture_time += capture_start.elapsed();

        // Detection
        let process_start = Instant::now();
        let record = session.process_frame(&frame, &mut events);
        total_process_time += process_start.elapsed();

        // Output
        let output_start = Instant::now();
        output
            .write_events(&events.drain())
            .context("Failed to write events")?;
        output
            .write_record(&record)
            .context("Failed to write record")?;
        total_output_time += output_start.elapsed();

        frame_count += 1;

        // Log stats every 30 frames
        if frame_count % 30 == 0 {
            let avg_capture_ms = total_capture_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_process_ms = total_process_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let avg_output_ms = total_output_time.as_secs_f64() * 1000.0 / frame_count as f64;
            let total_ms = avg_capture_ms + avg_process_ms + avg_output_ms;
            let actual_fps = 1000.0 / total_ms;

            tracing::info!(
                "Frame {}: capture={:.1}ms, process={:.1}ms, output={:.1}ms, total={:.1}ms, fps={:.1}, mode={:?}",
                frame_count,
                avg_capture_ms,
                avg_process_ms,
                avg_output_ms,
                total_ms,
                actual_fps,
                session.mode()
            );
        }

        // Frame rate limiting
        if let Some(frame_duration) = frame_duration {
            let elapsed = loop_start.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }
        }
    }

    tracing::info!(
        "Processed {} frames ({} skipped), final range {:?}",
        frame_count,
        skipped,
        session.color_range()
    );
    Ok(())
}
