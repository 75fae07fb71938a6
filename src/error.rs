use thiserror::Error;

/// Geometry that cannot produce a meaningful defect measurement
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A triangle side has zero length so the far-point angle is undefined
    #[error("degenerate defect triangle: side lengths a={a}, b={b}, c={c}")]
    DegenerateTriangle { a: f64, b: f64, c: f64 },

    /// Hull indices do not address points of the contour
    #[error("hull index {index} out of range for contour of {len} points")]
    HullIndexOutOfRange { index: usize, len: usize },
}

/// Failure to turn encoded bytes into a frame
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame data is empty")]
    Empty,

    #[error("failed to decode frame: {0}")]
    Decode(#[from] image::ImageError),

    #[error("decoded frame has zero size")]
    ZeroSized,
}

/// A control message that is not a known command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("missing MODE: prefix in {0:?}")]
    MissingPrefix(String),

    #[error("unknown mode {0:?}")]
    UnknownMode(String),
}
