use thiserror::Error;

/// Top-level error type for Bezier curve evaluation.
#[derive(Debug, Error)]
pub enum BezierError {
    #[error(transparent)]
    Point(#[from] PointError),

    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Errors raised by control point operations.
#[derive(Debug, Error, PartialEq)]
pub enum PointError {
    #[error("invalid handle style tag: {tag}")]
    InvalidHandleStyle { tag: String },

    #[error("control point is not attached to a curve or has not been polled yet")]
    Unattached,

    #[error("control point not found")]
    NotFound,
}

/// Errors raised by curve-level operations.
#[derive(Debug, Error, PartialEq)]
pub enum CurveError {
    #[error("curve has no control points")]
    Empty,

    #[error("resolution must be positive and finite, got {value}")]
    InvalidResolution { value: f64 },

    #[error("point index {index} is out of range for a curve of {len} points")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors raised by the coordinate frame collaborator.
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("frame node not found")]
    NodeNotFound,

    #[error("frame transform is not invertible")]
    Singular,
}

/// Convenience type alias for results using [`BezierError`].
pub type Result<T> = std::result::Result<T, BezierError>;
