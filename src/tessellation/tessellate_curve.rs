use crate::curve::BezierCurve;
use crate::error::{CurveError, Result};
use crate::frame::{Frame, Space};

use super::Polyline;

/// Tessellates a whole curve into a polyline at the curve's own resolution.
///
/// Each segment contributes `resolution` chords; shared endpoints are
/// emitted once. A closed curve ends back at its first point.
pub struct TessellateCurve {
    space: Space,
}

impl TessellateCurve {
    /// Creates a new `TessellateCurve` operation producing points in `space`.
    #[must_use]
    pub fn new(space: Space) -> Self {
        Self { space }
    }

    /// Executes the tessellation, returning a polyline.
    ///
    /// # Errors
    ///
    /// Returns `Empty` for a curve without points, `Unattached` if a point has
    /// not been refreshed, or a frame error when converting to world space.
    pub fn execute<F: Frame + ?Sized>(&self, curve: &BezierCurve, frame: &F) -> Result<Polyline> {
        if curve.point_count() == 0 {
            return Err(CurveError::Empty.into());
        }
        let steps = curve.settings().sample_steps();
        let segment_count = curve.segment_count();

        let capacity = segment_count
            .checked_mul(steps)
            .and_then(|n| n.checked_add(1))
            .unwrap_or(0);
        let mut points = Vec::with_capacity(capacity);
        if segment_count == 0 {
            points.push(curve.evaluate_local(0.0)?);
        }
        for index in 0..segment_count {
            let samples = curve.segment(index)?.sample(steps);
            let skip = usize::from(index > 0);
            points.extend(samples.into_iter().skip(skip));
        }

        if self.space == Space::World {
            for point in &mut points {
                *point = frame.transform_point_to_world(curve.node(), point)?;
            }
        }
        Ok(Polyline { points })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::curve::HandleStyle;
    use crate::frame::SceneGraph;
    use crate::math::{Matrix4, Point3, Vector3};

    const TOL: f64 = 1e-10;

    fn square(closed: bool) -> (SceneGraph, BezierCurve) {
        let mut graph = SceneGraph::new();
        let node = graph.add_root(Matrix4::new_translation(&Vector3::new(0.0, 0.0, 1.0)));
        let mut curve = BezierCurve::new(node);
        curve.set_resolution(4.0).unwrap();
        curve.set_closed(closed);
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            let at = Point3::new(x, y, 0.0);
            curve
                .add_point(&graph, HandleStyle::None, at, at, at, Space::Local)
                .unwrap();
        }
        (graph, curve)
    }

    #[test]
    fn open_polyline_shares_segment_endpoints() {
        let (graph, curve) = square(false);
        let polyline = TessellateCurve::new(Space::Local).execute(&curve, &graph).unwrap();
        assert_eq!(polyline.points.len(), 3 * 4 + 1);
        assert_eq!(polyline.points[4], Point3::new(1.0, 0.0, 0.0));
        assert!((polyline.length() - 3.0).abs() < TOL);
    }

    #[test]
    fn closed_polyline_returns_to_start() {
        let (graph, curve) = square(true);
        let polyline = TessellateCurve::new(Space::Local).execute(&curve, &graph).unwrap();
        assert_eq!(polyline.points.len(), 4 * 4 + 1);
        assert_eq!(polyline.points.first(), polyline.points.last());
        assert!((polyline.length() - curve.length().unwrap()).abs() < TOL);
    }

    #[test]
    fn world_polyline_is_offset_by_curve_frame() {
        let (graph, curve) = square(false);
        let polyline = TessellateCurve::new(Space::World).execute(&curve, &graph).unwrap();
        assert!(polyline.points.iter().all(|p| (p.z - 1.0).abs() < TOL));
    }

    #[test]
    fn empty_curve_is_rejected() {
        let mut graph = SceneGraph::new();
        let curve = BezierCurve::new(graph.add_root(Matrix4::identity()));
        assert!(TessellateCurve::new(Space::Local).execute(&curve, &graph).is_err());
    }
}
