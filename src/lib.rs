//! Real-time hand gesture recognition from camera frames.
//!
//! Two interchangeable strategies feed one record format: a landmark model
//! (behind the `onnx` feature) and a classical colour segmentation and
//! contour geometry pipeline, with on-demand skin-colour calibration.

pub mod calibration;
pub mod capture;
pub mod contour;
pub mod error;
pub mod events;
pub mod gesture;
pub mod landmarks;
pub mod output;
pub mod pipeline;
pub mod segmentation;
pub mod session;
pub mod skeleton;
pub mod smoothing;

pub use error::{CommandError, FrameError, GeometryError};
pub use events::{EventLog, LogEvent, Severity};
pub use gesture::Gesture;
pub use session::{Command, GestureRecord, Mode, Session, SessionConfig, Strategy};
