mod scene;

pub use scene::{NodeData, SceneGraph};

use crate::error::FrameError;
use crate::math::Point3;

slotmap::new_key_type! {
    /// Unique identifier for a coordinate frame node supplied by the host.
    pub struct NodeId;
}

/// Coordinate space in which a position is expressed or requested.
///
/// For curve-level calls `Local` and `CurveLocal` both refer to the
/// curve's own frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    /// The owning node's own frame.
    Local,
    /// The owning curve's frame.
    CurveLocal,
    /// World space.
    World,
}

/// Position-space conversions supplied by the host.
///
/// The curve engine depends only on these four operations; any transform
/// hierarchy can back them.
pub trait Frame {
    /// Returns the world-space origin of `node`.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown to the host.
    fn world_position(&self, node: NodeId) -> Result<Point3, FrameError>;

    /// Returns the origin of `node` expressed in the frame of `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if either node is unknown or `parent` is not invertible.
    fn local_position(&self, node: NodeId, parent: NodeId) -> Result<Point3, FrameError>;

    /// Maps a point expressed in `node`'s frame into world space.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown to the host.
    fn transform_point_to_world(&self, node: NodeId, point: &Point3) -> Result<Point3, FrameError>;

    /// Maps a world-space point into `node`'s frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown or its transform is not invertible.
    fn transform_point_from_world(
        &self,
        node: NodeId,
        point: &Point3,
    ) -> Result<Point3, FrameError>;
}

/// Re-expresses `point` from the frame of `from` into the frame of `to`.
///
/// # Errors
///
/// Propagates any failure from the frame collaborator.
pub fn transform_between<F: Frame + ?Sized>(
    frame: &F,
    from: NodeId,
    to: NodeId,
    point: &Point3,
) -> Result<Point3, FrameError> {
    if from == to {
        return Ok(*point);
    }
    let world = frame.transform_point_to_world(from, point)?;
    frame.transform_point_from_world(to, &world)
}
