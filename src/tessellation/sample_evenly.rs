use crate::curve::BezierCurve;
use crate::error::Result;
use crate::frame::{Frame, Space};

use super::Polyline;

/// Places `count` points along a curve at `t = i / count`, spaced by arc length.
///
/// The end of the curve (`t = 1`) is not included.
pub struct SampleEvenly {
    count: usize,
    space: Space,
}

impl SampleEvenly {
    /// Creates a new `SampleEvenly` query.
    #[must_use]
    pub fn new(count: usize, space: Space) -> Self {
        Self { count, space }
    }

    /// Executes the query, returning the sampled positions in order.
    ///
    /// # Errors
    ///
    /// Returns `Empty` for a non-zero count on a curve without points, or a
    /// frame error when converting to world space.
    pub fn execute<F: Frame + ?Sized>(&self, curve: &BezierCurve, frame: &F) -> Result<Polyline> {
        #[allow(clippy::cast_precision_loss)]
        let step = 1.0 / self.count.max(1) as f64;
        let points = (0..self.count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f64 * step;
                curve.evaluate(frame, t, self.space)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Polyline { points })
    }
}
