//! Scene traversal boundary
//!
//! The paint tool never owns scene nodes. It walks the visible mesh-bearing
//! nodes of a [`PaintScene`] once per frame and is told about node
//! destruction through [`NodeDestroyListener`].

pub mod scene_tree;

use std::sync::Arc;

use crate::assets::StaticMesh;
use crate::foundation::collections::NodeId;
use crate::foundation::math::Transform;

pub use scene_tree::SceneTree;

/// One visible mesh-bearing node as seen during traversal
#[derive(Debug, Clone)]
pub struct MeshInstance<'a> {
    /// Node identity
    pub node: NodeId,
    /// Mesh asset the node renders
    pub mesh: &'a Arc<StaticMesh>,
    /// Node transform in world space
    pub world_transform: Transform,
}

/// A live scene the paint tool can mirror
pub trait PaintScene {
    /// Visit every visible mesh-bearing node exactly once
    ///
    /// Subtrees under an invisible node are skipped entirely.
    fn visit_visible_meshes(&self, visitor: &mut dyn FnMut(MeshInstance<'_>));
}

/// Notified synchronously whenever a scene node is destroyed
pub trait NodeDestroyListener {
    /// Called once per destroyed node, before its identity can be reused
    fn on_node_destroyed(&mut self, node: NodeId);
}
