use slotmap::SlotMap;

use crate::error::FrameError;
use crate::math::{Matrix4, Point3, Vector3};

use super::{Frame, NodeId};

/// Data associated with a frame node.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Parent node, or `None` for a root in world space.
    pub parent: Option<NodeId>,
    /// Transform from this node's frame into its parent's frame.
    pub local_transform: Matrix4,
}

/// Minimal transform hierarchy implementing [`Frame`].
///
/// Nodes are stored in an arena and reference their parent by ID, so
/// hosts without their own scene graph can drive curves directly.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, NodeData>,
}

impl SceneGraph {
    /// Creates a new, empty scene graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a root node with the given transform and returns its ID.
    pub fn add_root(&mut self, local_transform: Matrix4) -> NodeId {
        self.nodes.insert(NodeData {
            parent: None,
            local_transform,
        })
    }

    /// Inserts a child of `parent` and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is not in the graph.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        local_transform: Matrix4,
    ) -> Result<NodeId, FrameError> {
        self.node(parent)?;
        Ok(self.nodes.insert(NodeData {
            parent: Some(parent),
            local_transform,
        }))
    }

    /// Returns a reference to the node data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not in the graph.
    pub fn node(&self, id: NodeId) -> Result<&NodeData, FrameError> {
        self.nodes.get(id).ok_or(FrameError::NodeNotFound)
    }

    /// Removes a node and returns its data.
    ///
    /// Children keep their stale parent link and fail to resolve afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not in the graph.
    pub fn remove(&mut self, node: NodeId) -> Result<NodeData, FrameError> {
        self.nodes.remove(node).ok_or(FrameError::NodeNotFound)
    }

    /// Replaces the local transform of `node`.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not in the graph.
    pub fn set_local_transform(
        &mut self,
        node: NodeId,
        transform: Matrix4,
    ) -> Result<(), FrameError> {
        let data = self.nodes.get_mut(node).ok_or(FrameError::NodeNotFound)?;
        data.local_transform = transform;
        Ok(())
    }

    /// Replaces the translation part of `node`'s local transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not in the graph.
    pub fn set_translation(
        &mut self,
        node: NodeId,
        translation: Vector3,
    ) -> Result<(), FrameError> {
        let data = self.nodes.get_mut(node).ok_or(FrameError::NodeNotFound)?;
        data.local_transform
            .fixed_view_mut::<3, 1>(0, 3)
            .copy_from(&translation);
        Ok(())
    }

    /// Composes the transform from `node`'s frame to world space.
    ///
    /// # Errors
    ///
    /// Returns an error if the node or one of its ancestors is missing.
    pub fn world_matrix(&self, node: NodeId) -> Result<Matrix4, FrameError> {
        let mut matrix = Matrix4::identity();
        let mut current = Some(node);
        while let Some(id) = current {
            let data = self.node(id)?;
            matrix = data.local_transform * matrix;
            current = data.parent;
        }
        Ok(matrix)
    }
}

impl Frame for SceneGraph {
    fn world_position(&self, node: NodeId) -> Result<Point3, FrameError> {
        self.transform_point_to_world(node, &Point3::origin())
    }

    fn local_position(&self, node: NodeId, parent: NodeId) -> Result<Point3, FrameError> {
        let world = self.world_position(node)?;
        self.transform_point_from_world(parent, &world)
    }

    fn transform_point_to_world(&self, node: NodeId, point: &Point3) -> Result<Point3, FrameError> {
        let matrix = self.world_matrix(node)?;
        Ok(transform_point(&matrix, point))
    }

    fn transform_point_from_world(
        &self,
        node: NodeId,
        point: &Point3,
    ) -> Result<Point3, FrameError> {
        let inverse = self
            .world_matrix(node)?
            .try_inverse()
            .ok_or(FrameError::Singular)?;
        Ok(transform_point(&inverse, point))
    }
}

/// Transforms a point by a 4x4 matrix (homogeneous coordinates).
fn transform_point(matrix: &Matrix4, point: &Point3) -> Point3 {
    let v = matrix * nalgebra::Vector4::new(point.x, point.y, point.z, 1.0);
    Point3::new(v.x, v.y, v.z)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    fn translation(x: f64, y: f64, z: f64) -> Matrix4 {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    #[test]
    fn child_inherits_parent_translation() {
        let mut graph = SceneGraph::new();
        let root = graph.add_root(translation(1.0, 2.0, 3.0));
        let child = graph.add_child(root, translation(10.0, 0.0, 0.0)).unwrap();

        let world = graph.world_position(child).unwrap();
        assert!((world - Point3::new(11.0, 2.0, 3.0)).norm() < TOL);

        let local = graph.local_position(child, root).unwrap();
        assert!((local - Point3::new(10.0, 0.0, 0.0)).norm() < TOL);
    }

    #[test]
    fn scaled_frame_round_trips_points() {
        let mut graph = SceneGraph::new();
        let root = graph.add_root(Matrix4::new_scaling(2.0));
        let p = Point3::new(1.0, -1.0, 0.5);

        let world = graph.transform_point_to_world(root, &p).unwrap();
        assert!((world - Point3::new(2.0, -2.0, 1.0)).norm() < TOL);

        let back = graph.transform_point_from_world(root, &world).unwrap();
        assert!((back - p).norm() < TOL);
    }

    #[test]
    fn set_translation_keeps_rotation() {
        let mut graph = SceneGraph::new();
        let rotation = Matrix4::new_rotation(Vector3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2));
        let root = graph.add_root(rotation);
        graph.set_translation(root, Vector3::new(5.0, 0.0, 0.0)).unwrap();

        // (1,0,0) rotated 90° about Z is (0,1,0), then shifted by +5 in X.
        let world = graph
            .transform_point_to_world(root, &Point3::new(1.0, 0.0, 0.0))
            .unwrap();
        assert!((world - Point3::new(5.0, 1.0, 0.0)).norm() < TOL, "world={world}");
    }

    #[test]
    fn singular_frame_cannot_map_from_world() {
        let mut graph = SceneGraph::new();
        let flat = graph.add_root(Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, 0.0)));
        let err = graph
            .transform_point_from_world(flat, &Point3::origin())
            .unwrap_err();
        assert_eq!(err, FrameError::Singular);
    }

    #[test]
    fn removed_node_breaks_descendants() {
        let mut graph = SceneGraph::new();
        let root = graph.add_root(Matrix4::identity());
        let child = graph.add_child(root, translation(1.0, 0.0, 0.0)).unwrap();
        graph.remove(root).unwrap();

        assert_eq!(
            graph.add_child(root, Matrix4::identity()).unwrap_err(),
            FrameError::NodeNotFound
        );
        assert_eq!(graph.world_position(child).unwrap_err(), FrameError::NodeNotFound);
    }
}
