use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::error::{PointError, Result};
use crate::frame::{transform_between, Frame, NodeId, Space};
use crate::math::{Point3, Vector3};

/// Relationship between a control point's two handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandleStyle {
    /// Handles are mirrored across the point: `handle2 == -handle1`.
    #[default]
    Connected,
    /// Each handle moves independently.
    Broken,
    /// Both handles sit on the point (zero offsets).
    None,
}

impl TryFrom<u8> for HandleStyle {
    type Error = PointError;

    fn try_from(tag: u8) -> std::result::Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Connected),
            1 => Ok(Self::Broken),
            2 => Ok(Self::None),
            _ => Err(PointError::InvalidHandleStyle {
                tag: tag.to_string(),
            }),
        }
    }
}

impl FromStr for HandleStyle {
    type Err = PointError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "connected" => Ok(Self::Connected),
            "broken" => Ok(Self::Broken),
            "none" => Ok(Self::None),
            _ => Err(PointError::InvalidHandleStyle { tag: s.to_owned() }),
        }
    }
}

impl fmt::Display for HandleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connected => "connected",
            Self::Broken => "broken",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

/// Selects one of a control point's two handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    /// The incoming handle, facing the previous point.
    First,
    /// The outgoing handle, facing the next point.
    Second,
}

impl Handle {
    /// Returns the opposite handle.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// A control point's geometry expressed in its owning curve's frame.
///
/// Captured by [`ControlPoint::poll`] and read by segment evaluation until
/// the next refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveLocalState {
    /// Position of the point.
    pub position: Point3,
    /// Absolute position of the first handle.
    pub handle1: Point3,
    /// Absolute position of the second handle.
    pub handle2: Point3,
    /// Whether the first handle had a non-zero offset.
    pub handle1_active: bool,
    /// Whether the second handle had a non-zero offset.
    pub handle2_active: bool,
}

impl CurveLocalState {
    /// The handle shaping the segment arriving at this point, if active.
    #[must_use]
    pub fn incoming_handle(&self) -> Option<Point3> {
        self.handle1_active.then_some(self.handle1)
    }

    /// The handle shaping the segment leaving this point, if active.
    #[must_use]
    pub fn outgoing_handle(&self) -> Option<Point3> {
        self.handle2_active.then_some(self.handle2)
    }
}

/// A position on a curve with two tangent handles.
///
/// The position and handle offsets are authoritative in the point's own
/// frame (`node`). Curve-space copies are refreshed only by [`poll`](Self::poll).
#[derive(Debug, Clone)]
pub struct ControlPoint {
    node: NodeId,
    position_local: Point3,
    handle1_offset: Vector3,
    handle2_offset: Vector3,
    handle_style: HandleStyle,
    owner: Option<NodeId>,
    curve_local: Option<CurveLocalState>,
    last_world_position: Option<Point3>,
    dirty: bool,
}

impl ControlPoint {
    /// Creates an unattached point at the origin of `node`'s frame with zero handles.
    #[must_use]
    pub fn new(node: NodeId, handle_style: HandleStyle) -> Self {
        Self {
            node,
            position_local: Point3::origin(),
            handle1_offset: Vector3::zeros(),
            handle2_offset: Vector3::zeros(),
            handle_style,
            owner: None,
            curve_local: None,
            last_world_position: None,
            dirty: true,
        }
    }

    /// Returns the frame node the point's position and handles are expressed in.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Returns the frame node of the owning curve, if attached.
    #[must_use]
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    /// Returns whether the point changed since its last refresh.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn attach(&mut self, owner: NodeId) {
        self.owner = Some(owner);
        self.dirty = true;
    }

    pub(crate) fn detach(&mut self) {
        self.owner = None;
        self.curve_local = None;
        self.dirty = true;
    }

    // --- Handle style ---

    /// Returns the handle style.
    #[must_use]
    pub fn handle_style(&self) -> HandleStyle {
        self.handle_style
    }

    /// Changes the handle style and re-establishes its invariant.
    ///
    /// Switching to `Connected` mirrors the first handle onto the second;
    /// switching to `None` zeroes both.
    pub fn set_handle_style(&mut self, style: HandleStyle) {
        if self.handle_style == style {
            return;
        }
        self.handle_style = style;
        match style {
            HandleStyle::Connected => self.handle2_offset = -self.handle1_offset,
            HandleStyle::None => {
                self.handle1_offset = Vector3::zeros();
                self.handle2_offset = Vector3::zeros();
            }
            HandleStyle::Broken => {}
        }
        self.dirty = true;
    }

    /// Changes the handle style from a raw tag (`0` connected, `1` broken, `2` none).
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandleStyle` for any other tag; the point is left unchanged.
    pub fn set_handle_style_tag(&mut self, tag: u8) -> Result<()> {
        let style = HandleStyle::try_from(tag)?;
        self.set_handle_style(style);
        Ok(())
    }

    // --- Position ---

    /// Returns the position in the point's own frame.
    #[must_use]
    pub fn position_local(&self) -> Point3 {
        self.position_local
    }

    /// Mutable access to the authoritative position, bypassing change tracking.
    ///
    /// Edits made here are picked up by the next [`poll`](Self::poll) through
    /// the world-position comparison.
    pub fn position_local_mut(&mut self) -> &mut Point3 {
        &mut self.position_local
    }

    /// Sets the position in the point's own frame.
    pub fn set_position_local(&mut self, position: Point3) {
        if self.position_local == position {
            return;
        }
        self.position_local = position;
        self.dirty = true;
    }

    /// Returns the position in the requested space.
    ///
    /// `CurveLocal` returns the value cached by the last poll.
    ///
    /// # Errors
    ///
    /// Returns `Unattached` for `CurveLocal` before the first poll, or a frame
    /// error if the conversion fails.
    pub fn position<F: Frame + ?Sized>(&self, frame: &F, space: Space) -> Result<Point3> {
        match space {
            Space::Local => Ok(self.position_local),
            Space::CurveLocal => Ok(self.curve_local_state()?.position),
            Space::World => Ok(frame.transform_point_to_world(self.node, &self.position_local)?),
        }
    }

    /// Sets the position from a value expressed in `space`.
    ///
    /// # Errors
    ///
    /// Returns `Unattached` when `space` is `CurveLocal` and the point has no
    /// owner, or a frame error if the conversion fails.
    pub fn set_position<F: Frame + ?Sized>(
        &mut self,
        frame: &F,
        space: Space,
        position: Point3,
    ) -> Result<()> {
        let local = self.to_local(frame, space, &position)?;
        self.set_position_local(local);
        Ok(())
    }

    // --- Handles ---

    /// Returns a handle's offset from the point, in the point's own frame.
    #[must_use]
    pub fn handle_offset(&self, which: Handle) -> Vector3 {
        match which {
            Handle::First => self.handle1_offset,
            Handle::Second => self.handle2_offset,
        }
    }

    /// Sets a handle's offset in the point's own frame.
    ///
    /// Under `Connected` the other handle is mirrored. Under `None` the call
    /// is ignored and both offsets stay zero.
    pub fn set_handle_offset(&mut self, which: Handle, offset: Vector3) {
        if self.handle_style == HandleStyle::None {
            trace!(?which, "ignoring handle edit on a point without handles");
            return;
        }
        if self.handle_offset(which) == offset {
            return;
        }
        *self.handle_offset_mut(which) = offset;
        if self.handle_style == HandleStyle::Connected {
            *self.handle_offset_mut(which.other()) = -offset;
        }
        self.dirty = true;
    }

    /// Returns the absolute handle position in the requested space.
    ///
    /// # Errors
    ///
    /// Returns `Unattached` for `CurveLocal` before the first poll, or a frame
    /// error if the conversion fails.
    pub fn handle<F: Frame + ?Sized>(
        &self,
        frame: &F,
        which: Handle,
        space: Space,
    ) -> Result<Point3> {
        let local = self.position_local + self.handle_offset(which);
        match space {
            Space::Local => Ok(local),
            Space::CurveLocal => {
                let state = self.curve_local_state()?;
                Ok(match which {
                    Handle::First => state.handle1,
                    Handle::Second => state.handle2,
                })
            }
            Space::World => Ok(frame.transform_point_to_world(self.node, &local)?),
        }
    }

    /// Sets a handle from an absolute position expressed in `space`.
    ///
    /// # Errors
    ///
    /// Returns `Unattached` when `space` is `CurveLocal` and the point has no
    /// owner, or a frame error if the conversion fails.
    pub fn set_handle<F: Frame + ?Sized>(
        &mut self,
        frame: &F,
        which: Handle,
        space: Space,
        position: Point3,
    ) -> Result<()> {
        let local = self.to_local(frame, space, &position)?;
        self.set_handle_offset(which, local - self.position_local);
        Ok(())
    }

    fn handle_offset_mut(&mut self, which: Handle) -> &mut Vector3 {
        match which {
            Handle::First => &mut self.handle1_offset,
            Handle::Second => &mut self.handle2_offset,
        }
    }

    // --- Curve space ---

    /// Returns the curve-space state captured by the last poll.
    ///
    /// # Errors
    ///
    /// Returns `Unattached` if the point has no owner or was never polled.
    pub fn curve_local_state(&self) -> std::result::Result<&CurveLocalState, PointError> {
        if self.owner.is_none() {
            return Err(PointError::Unattached);
        }
        self.curve_local.as_ref().ok_or(PointError::Unattached)
    }

    /// Returns the origin of this point's frame expressed in the owning curve's frame.
    ///
    /// # Errors
    ///
    /// Returns `Unattached` without an owner, or a frame error.
    pub fn frame_origin<F: Frame + ?Sized>(&self, frame: &F) -> Result<Point3> {
        let owner = self.owner.ok_or(PointError::Unattached)?;
        Ok(frame.local_position(self.node, owner)?)
    }

    /// Per-tick refresh.
    ///
    /// Detects movement through the world position, then recomputes the
    /// curve-space cache if anything changed. Returns `true` when the owning
    /// curve must invalidate its length cache.
    ///
    /// # Errors
    ///
    /// Returns `Unattached` if a refresh is needed but the point has no owner,
    /// or a frame error if a conversion fails.
    pub fn poll<F: Frame + ?Sized>(&mut self, frame: &F) -> Result<bool> {
        let world = frame.transform_point_to_world(self.node, &self.position_local)?;
        if self.last_world_position != Some(world) {
            self.dirty = true;
            self.last_world_position = Some(world);
        }
        if !self.dirty {
            return Ok(false);
        }

        let owner = self.owner.ok_or(PointError::Unattached)?;
        let to_curve = |p: &Point3| transform_between(frame, self.node, owner, p);
        let state = CurveLocalState {
            position: to_curve(&self.position_local)?,
            handle1: to_curve(&(self.position_local + self.handle1_offset))?,
            handle2: to_curve(&(self.position_local + self.handle2_offset))?,
            handle1_active: self.handle1_offset != Vector3::zeros(),
            handle2_active: self.handle2_offset != Vector3::zeros(),
        };
        trace!(position = ?state.position, "refreshed curve-local cache");
        self.curve_local = Some(state);
        self.dirty = false;
        Ok(true)
    }

    fn to_local<F: Frame + ?Sized>(
        &self,
        frame: &F,
        space: Space,
        point: &Point3,
    ) -> Result<Point3> {
        match space {
            Space::Local => Ok(*point),
            Space::CurveLocal => {
                let owner = self.owner.ok_or(PointError::Unattached)?;
                Ok(transform_between(frame, owner, self.node, point)?)
            }
            Space::World => Ok(frame.transform_point_from_world(self.node, point)?),
        }
    }
}
