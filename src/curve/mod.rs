mod cache;
mod point;
mod settings;

pub use cache::Cached;
pub use point::{ControlPoint, CurveLocalState, Handle, HandleStyle};
pub use settings::{validate_resolution, CurveSettings, DEFAULT_RESOLUTION, MAX_RESOLUTION};

use std::cell::Ref;

use slotmap::SlotMap;
use tracing::{debug, trace, warn};

use crate::error::{CurveError, PointError, Result};
use crate::frame::{Frame, NodeId, Space};
use crate::geometry::Segment;
use crate::math::{Point3, TOLERANCE};

slotmap::new_key_type! {
    /// Stable handle to a control point owned by a curve.
    pub struct PointId;
}

/// Approximate per-segment lengths in traversal order, plus their sum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LengthTable {
    /// One entry per segment, including the wrap segment of a closed curve.
    pub segments: Vec<f64>,
    /// Sum of `segments`.
    pub total: f64,
}

/// A piecewise Bezier curve through an ordered chain of control points.
///
/// Points live in an arena owned by the curve; the order vector defines the
/// traversal. The total length is sampled lazily and cached until the next
/// mutation or a poll that reports movement.
#[derive(Debug)]
pub struct BezierCurve {
    node: NodeId,
    points: SlotMap<PointId, ControlPoint>,
    order: Vec<PointId>,
    settings: CurveSettings,
    generation: u64,
    lengths: Cached<LengthTable>,
}

impl BezierCurve {
    /// Creates an empty open curve in the frame of `node` with default settings.
    #[must_use]
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            points: SlotMap::with_key(),
            order: Vec::new(),
            settings: CurveSettings::default(),
            generation: 0,
            lengths: Cached::new(),
        }
    }

    /// Creates an empty curve with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResolution` if the settings carry a resolution outside
    /// `(0, MAX_RESOLUTION]`.
    pub fn with_settings(node: NodeId, settings: CurveSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Self::new(node)
        })
    }

    /// Returns the frame node the curve is expressed in.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Returns the current settings.
    #[must_use]
    pub fn settings(&self) -> CurveSettings {
        self.settings
    }

    /// Returns the world-space origin of the curve's frame.
    ///
    /// # Errors
    ///
    /// Returns a frame error if the host cannot resolve the curve's node.
    pub fn origin<F: Frame + ?Sized>(&self, frame: &F) -> Result<Point3> {
        Ok(frame.world_position(self.node)?)
    }

    /// Returns whether the last point connects back to the first.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.settings.closed
    }

    /// Opens or closes the curve.
    pub fn set_closed(&mut self, closed: bool) {
        if self.settings.closed != closed {
            self.settings.closed = closed;
            debug!(closed, "curve topology changed");
            self.invalidate();
        }
    }

    /// Returns the sampling resolution.
    #[must_use]
    pub fn resolution(&self) -> f64 {
        self.settings.resolution
    }

    /// Sets the sampling resolution.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResolution` for NaN or values outside `(0, MAX_RESOLUTION]`.
    #[allow(clippy::float_cmp)]
    pub fn set_resolution(&mut self, resolution: f64) -> Result<()> {
        let resolution = validate_resolution(resolution)?;
        if self.settings.resolution != resolution {
            self.settings.resolution = resolution;
            debug!(resolution, "curve resolution changed");
            self.invalidate();
        }
        Ok(())
    }

    /// Returns whether the cached length must be recomputed on the next read.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.lengths.is_valid(self.generation)
    }

    fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    // --- Point management ---

    /// Creates a point in the curve's frame, appends it and returns its handle.
    ///
    /// `position` and both handle positions are absolute and expressed in
    /// `space`. Handles are applied in order, so under `Connected` the second
    /// handle wins.
    ///
    /// # Errors
    ///
    /// Returns a frame error if a conversion fails; nothing is added.
    pub fn add_point<F: Frame + ?Sized>(
        &mut self,
        frame: &F,
        style: HandleStyle,
        position: Point3,
        handle1: Point3,
        handle2: Point3,
        space: Space,
    ) -> Result<PointId> {
        let mut point = ControlPoint::new(self.node, style);
        point.attach(self.node);
        point.set_position(frame, space, position)?;
        point.set_handle(frame, Handle::First, space, handle1)?;
        point.set_handle(frame, Handle::Second, space, handle2)?;
        self.insert_point(frame, self.order.len(), point)
    }

    /// Appends a point built by the host, possibly in its own frame.
    ///
    /// # Errors
    ///
    /// Returns a frame error if the initial refresh fails; the point is dropped.
    pub fn attach_point<F: Frame + ?Sized>(
        &mut self,
        frame: &F,
        point: ControlPoint,
    ) -> Result<PointId> {
        self.insert_point(frame, self.order.len(), point)
    }

    /// Inserts a point at `index` in the traversal order.
    ///
    /// The point is attached and polled once so its curve-space cache is ready.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index > point_count()`, or a frame error
    /// if the initial refresh fails; the point is dropped in both cases.
    pub fn insert_point<F: Frame + ?Sized>(
        &mut self,
        frame: &F,
        index: usize,
        mut point: ControlPoint,
    ) -> Result<PointId> {
        if index > self.order.len() {
            return Err(CurveError::IndexOutOfRange {
                index,
                len: self.order.len(),
            }
            .into());
        }
        point.attach(self.node);
        point.poll(frame)?;
        let id = self.points.insert(point);
        self.order.insert(index, id);
        debug!(index, count = self.order.len(), "attached control point");
        self.invalidate();
        Ok(id)
    }

    /// Removes a point and returns it detached from this curve.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the handle does not belong to this curve.
    pub fn remove_point(&mut self, id: PointId) -> Result<ControlPoint> {
        let mut point = self.points.remove(id).ok_or(PointError::NotFound)?;
        self.order.retain(|&p| p != id);
        point.detach();
        debug!(count = self.order.len(), "detached control point");
        self.invalidate();
        Ok(point)
    }

    /// Moves the point at `from` so it ends up at index `to`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if either index is past the end.
    pub fn move_point(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.order.len();
        for index in [from, to] {
            if index >= len {
                return Err(CurveError::IndexOutOfRange { index, len }.into());
            }
        }
        if from != to {
            let id = self.order.remove(from);
            self.order.insert(to, id);
            self.invalidate();
        }
        Ok(())
    }

    /// Returns a reference to a point, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the handle does not belong to this curve.
    pub fn point(&self, id: PointId) -> std::result::Result<&ControlPoint, PointError> {
        self.points.get(id).ok_or(PointError::NotFound)
    }

    /// Returns a mutable reference to a point, or an error if not found.
    ///
    /// Edits become visible to length and evaluation after the next [`poll`](Self::poll).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the handle does not belong to this curve.
    pub fn point_mut(&mut self, id: PointId) -> std::result::Result<&mut ControlPoint, PointError> {
        self.points.get_mut(id).ok_or(PointError::NotFound)
    }

    /// Point handles in traversal order.
    #[must_use]
    pub fn point_ids(&self) -> &[PointId] {
        &self.order
    }

    /// Returns the number of points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.order.len()
    }

    /// Returns the number of segments, counting the wrap segment when closed.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        match self.order.len() {
            0 | 1 => 0,
            n if self.settings.closed => n,
            n => n - 1,
        }
    }

    /// Per-tick refresh of every point.
    ///
    /// Returns `true` if any point changed, in which case the length cache is
    /// invalidated.
    ///
    /// # Errors
    ///
    /// Returns the first frame error raised while refreshing. Points refreshed
    /// before the failure still invalidate the length cache.
    pub fn poll<F: Frame + ?Sized>(&mut self, frame: &F) -> Result<bool> {
        let mut changed = false;
        let mut failure = None;
        for &id in &self.order {
            let refreshed = match self.points.get_mut(id) {
                Some(point) => point.poll(frame),
                None => Err(PointError::NotFound.into()),
            };
            match refreshed {
                Ok(point_changed) => changed |= point_changed,
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }
        if changed {
            trace!("control points changed; length cache invalidated");
            self.invalidate();
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(changed),
        }
    }

    // --- Evaluation ---

    /// Returns segment `index` built from the points' cached curve-space state.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` past the last segment, or `Unattached` if a
    /// point has not been refreshed.
    pub fn segment(&self, index: usize) -> Result<Segment> {
        let count = self.segment_count();
        if index >= count {
            return Err(CurveError::IndexOutOfRange { index, len: count }.into());
        }
        let start = self.state_at(index)?;
        let end = self.state_at((index + 1) % self.order.len())?;
        Ok(Segment::from_ends(
            start.position,
            start.outgoing_handle(),
            end.incoming_handle(),
            end.position,
        ))
    }

    /// Approximate length of segment `index` at the current resolution.
    ///
    /// # Errors
    ///
    /// See [`segment`](Self::segment).
    pub fn segment_length(&self, index: usize) -> Result<f64> {
        Ok(self.segment(index)?.approximate_length(self.settings.sample_steps()))
    }

    /// Returns the cached per-segment lengths, recomputing them if stale.
    ///
    /// # Errors
    ///
    /// Returns `Unattached` if a point has not been refreshed.
    pub fn length_table(&self) -> Result<Ref<'_, LengthTable>> {
        self.lengths
            .get_or_try_update(self.generation, || self.compute_length_table())
    }

    /// Returns the approximate total length.
    ///
    /// # Errors
    ///
    /// Returns `Empty` for a curve without points.
    pub fn length(&self) -> Result<f64> {
        if self.order.is_empty() {
            return Err(CurveError::Empty.into());
        }
        Ok(self.length_table()?.total)
    }

    /// Evaluates the position at global parameter `t`, distributed by arc length.
    ///
    /// `t <= 0` returns the first point and `t >= 1` the last point, also on
    /// closed curves.
    ///
    /// # Errors
    ///
    /// Returns `Empty` for a curve without points, or a frame error when
    /// converting to world space.
    pub fn evaluate<F: Frame + ?Sized>(&self, frame: &F, t: f64, space: Space) -> Result<Point3> {
        let local = self.evaluate_local(t)?;
        match space {
            Space::World => Ok(frame.transform_point_to_world(self.node, &local)?),
            Space::Local | Space::CurveLocal => Ok(local),
        }
    }

    /// Evaluates the position at global parameter `t` in the curve's frame.
    ///
    /// # Errors
    ///
    /// Returns `Empty` for a curve without points.
    pub fn evaluate_local(&self, t: f64) -> Result<Point3> {
        let (first, last) = match (self.order.first(), self.order.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Err(CurveError::Empty.into()),
        };
        if t <= 0.0 {
            return Ok(self.state(first)?.position);
        }
        if t >= 1.0 {
            return Ok(self.state(last)?.position);
        }

        let table = self.length_table()?;
        if table.segments.is_empty() || table.total <= TOLERANCE {
            return Ok(self.state(first)?.position);
        }

        let mut accumulated = 0.0;
        for (index, length) in table.segments.iter().enumerate() {
            let fraction = length / table.total;
            if accumulated + fraction > t {
                let u = (t - accumulated) / fraction;
                return Ok(self.segment(index)?.evaluate(u));
            }
            accumulated += fraction;
        }

        // Only reachable when rounding leaves the fractions summing just below `t`.
        warn!(t, accumulated, "segment search overran; using end of last segment");
        Ok(self.segment(table.segments.len() - 1)?.evaluate(1.0))
    }

    fn compute_length_table(&self) -> Result<LengthTable> {
        let steps = self.settings.sample_steps();
        let segments = (0..self.segment_count())
            .map(|index| self.segment(index).map(|segment| segment.approximate_length(steps)))
            .collect::<Result<Vec<f64>>>()?;
        let total: f64 = segments.iter().sum();
        trace!(segments = segments.len(), total, "recomputed curve length");
        Ok(LengthTable { segments, total })
    }

    fn state(&self, id: PointId) -> std::result::Result<&CurveLocalState, PointError> {
        self.point(id)?.curve_local_state()
    }

    fn state_at(&self, index: usize) -> Result<&CurveLocalState> {
        let id = self.order[index];
        Ok(self.state(id)?)
    }
}
