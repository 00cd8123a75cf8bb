//! Piecewise Bezier curves evaluated by arc length.
//!
//! A [`BezierCurve`] owns an ordered chain of [`ControlPoint`]s. Each pair of
//! consecutive points forms a linear, quadratic or cubic segment depending on
//! which handles are active. The total length is approximated by polyline
//! sampling and cached until a mutation or a [`BezierCurve::poll`] reports
//! movement. Coordinate conversions go through the host's [`Frame`].

pub mod curve;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod math;
pub mod tessellation;

#[cfg(test)]
mod test_support;

pub use curve::{BezierCurve, ControlPoint, CurveSettings, Handle, HandleStyle, PointId};
pub use error::{BezierError, Result};
pub use frame::{Frame, NodeId, SceneGraph, Space};
