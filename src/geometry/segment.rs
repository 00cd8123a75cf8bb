use crate::math::bezier::{cubic_point, lerp, quadratic_point};
use crate::math::Point3;

/// The polynomial shape of the span between two consecutive control points.
///
/// The order is chosen from which of the facing handles are active:
/// both active gives a cubic, one active a quadratic, none a straight line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Straight line between two points.
    Linear([Point3; 2]),
    /// Quadratic Bezier with one interior control point.
    Quadratic([Point3; 3]),
    /// Cubic Bezier with two interior control points.
    Cubic([Point3; 4]),
}

impl Segment {
    /// Builds the segment from `start` to `end`.
    ///
    /// `start_handle` is the absolute position of the start point's outgoing
    /// handle and `end_handle` the end point's incoming handle, each `None`
    /// when that handle is inactive.
    #[must_use]
    pub fn from_ends(
        start: Point3,
        start_handle: Option<Point3>,
        end_handle: Option<Point3>,
        end: Point3,
    ) -> Self {
        match (start_handle, end_handle) {
            (Some(h1), Some(h2)) => Self::Cubic([start, h1, h2, end]),
            (Some(h), None) | (None, Some(h)) => Self::Quadratic([start, h, end]),
            (None, None) => Self::Linear([start, end]),
        }
    }

    /// Evaluates the segment at the local parameter `u`.
    #[must_use]
    pub fn evaluate(&self, u: f64) -> Point3 {
        match self {
            Self::Linear([a, b]) => lerp(a, b, u),
            Self::Quadratic([a, b, c]) => quadratic_point(a, b, c, u),
            Self::Cubic([a, b, c, d]) => cubic_point(a, b, c, d, u),
        }
    }

    /// Samples the segment at `steps + 1` evenly spaced parameters in `[0, 1]`.
    #[must_use]
    pub fn sample(&self, steps: usize) -> Vec<Point3> {
        parameters(steps).map(|u| self.evaluate(u)).collect()
    }

    /// Approximates the arc length by summing chord lengths of the sampled polyline.
    ///
    /// Never exact for curved segments; converges from below as `steps` grows.
    /// Samples are streamed, so memory use does not grow with `steps`.
    #[must_use]
    pub fn approximate_length(&self, steps: usize) -> f64 {
        if let Self::Linear([a, b]) = self {
            // The polyline of a line is the line itself.
            return (b - a).norm();
        }
        let mut samples = parameters(steps).map(|u| self.evaluate(u));
        let Some(first) = samples.next() else {
            return 0.0;
        };
        let (_, length) = samples.fold((first, 0.0), |(previous, length), current| {
            (current, length + (current - previous).norm())
        });
        length
    }
}

/// `steps + 1` evenly spaced parameters from `0` to exactly `1`.
#[allow(clippy::cast_precision_loss)]
fn parameters(steps: usize) -> impl Iterator<Item = f64> {
    let steps = steps.max(1);
    (0..=steps).map(move |i| i as f64 / steps as f64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn shape_follows_active_handles() {
        let a = p(0.0, 0.0, 0.0);
        let b = p(3.0, 0.0, 0.0);
        let h = p(1.0, 1.0, 0.0);
        let k = p(2.0, 1.0, 0.0);

        assert_eq!(Segment::from_ends(a, None, None, b), Segment::Linear([a, b]));
        assert_eq!(Segment::from_ends(a, Some(h), None, b), Segment::Quadratic([a, h, b]));
        assert_eq!(Segment::from_ends(a, None, Some(k), b), Segment::Quadratic([a, k, b]));
        assert_eq!(Segment::from_ends(a, Some(h), Some(k), b), Segment::Cubic([a, h, k, b]));
    }

    #[test]
    fn linear_length_is_exact() {
        let seg = Segment::from_ends(p(0.0, 0.0, 0.0), None, None, p(3.0, 4.0, 0.0));
        assert_relative_eq!(seg.approximate_length(1), 5.0);
        assert_relative_eq!(seg.approximate_length(10), 5.0);
    }

    #[test]
    fn sample_includes_both_ends() {
        let seg = Segment::from_ends(
            p(0.0, 0.0, 0.0),
            Some(p(1.0, 2.0, 0.0)),
            None,
            p(2.0, 0.0, 0.0),
        );
        let samples = seg.sample(4);
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0], p(0.0, 0.0, 0.0));
        assert_eq!(samples[4], p(2.0, 0.0, 0.0));
    }

    #[test]
    fn curved_length_converges_from_below() {
        // Quarter circle approximation: true length is close to PI/2.
        let k = 0.552_284_749_8;
        let seg = Segment::from_ends(
            p(1.0, 0.0, 0.0),
            Some(p(1.0, k, 0.0)),
            Some(p(k, 1.0, 0.0)),
            p(0.0, 1.0, 0.0),
        );
        let coarse = seg.approximate_length(4);
        let medium = seg.approximate_length(32);
        let fine = seg.approximate_length(512);
        assert!(coarse <= medium && medium <= fine, "{coarse} {medium} {fine}");
        assert!((fine - std::f64::consts::FRAC_PI_2).abs() < 1e-3, "fine={fine}");
    }

    #[test]
    fn every_shape_stops_at_its_ends() {
        let (a, b) = (p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0));
        let h = p(1.0, 1.0, 0.0);
        for seg in [
            Segment::from_ends(a, None, None, b),
            Segment::from_ends(a, Some(h), None, b),
            Segment::from_ends(a, Some(h), Some(h), b),
        ] {
            assert_eq!(seg.evaluate(1.5), b, "{seg:?}");
            assert_eq!(seg.evaluate(-0.5), a, "{seg:?}");
        }
    }

    #[test]
    fn streamed_length_matches_sampled_polyline() {
        let seg = Segment::from_ends(
            p(0.0, 0.0, 0.0),
            Some(p(1.0, 3.0, 0.0)),
            Some(p(3.0, -2.0, 1.0)),
            p(4.0, 0.0, 0.0),
        );
        let samples = seg.sample(17);
        let polyline: f64 = samples.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
        assert_relative_eq!(seg.approximate_length(17), polyline, epsilon = 1e-12);
    }

    #[test]
    fn zero_steps_is_treated_as_one() {
        let seg = Segment::from_ends(
            p(0.0, 0.0, 0.0),
            Some(p(0.0, 1.0, 0.0)),
            None,
            p(1.0, 0.0, 0.0),
        );
        assert_eq!(seg.sample(0).len(), 2);
    }
}
