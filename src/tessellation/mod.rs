mod sample_evenly;
mod tessellate_curve;

pub use sample_evenly::SampleEvenly;
pub use tessellate_curve::TessellateCurve;

use crate::math::Point3;

/// A polyline approximation of a curve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    /// The ordered vertices of the polyline.
    pub points: Vec<Point3>,
}

impl Polyline {
    /// Sum of the distances between consecutive vertices.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }
}
