//! Minimal transform hierarchy
//!
//! Nodes live in a slot map and form a tree under a permanent root. Each node
//! has a local transform, a visibility flag and optionally a mesh.

use std::sync::Arc;

use crate::assets::StaticMesh;
use crate::foundation::collections::{NodeId, SlotMap};
use crate::foundation::math::Transform;
use super::{MeshInstance, NodeDestroyListener, PaintScene};

/// A node in the scene tree
#[derive(Debug)]
pub struct SceneNode {
    /// Display name
    pub name: String,
    /// Transform relative to the parent
    pub local_transform: Transform,
    /// Rendered mesh, if any
    pub mesh: Option<Arc<StaticMesh>>,
    /// Hidden nodes hide their whole subtree
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    fn new(name: String, local_transform: Transform, parent: Option<NodeId>) -> Self {
        Self {
            name,
            local_transform,
            mesh: None,
            visible: true,
            parent,
            children: Vec::new(),
        }
    }

    /// Parent node, `None` for the root
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Direct children in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Tree of scene nodes with a permanent root
#[derive(Debug)]
pub struct SceneTree {
    nodes: SlotMap<NodeId, SceneNode>,
    root: NodeId,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneTree {
    /// Create a tree containing only the root node
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new("root".to_string(), Transform::identity(), None));
        Self { nodes, root }
    }

    /// The root node
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Add a child node; `None` if the parent does not exist
    pub fn add_node(&mut self, parent: NodeId, name: impl Into<String>, local_transform: Transform) -> Option<NodeId> {
        if !self.nodes.contains_key(parent) {
            log::warn!("Cannot add node under missing parent {parent:?}");
            return None;
        }
        let id = self
            .nodes
            .insert(SceneNode::new(name.into(), local_transform, Some(parent)));
        self.nodes.get_mut(parent)?.children.push(id);
        Some(id)
    }

    /// Add a mesh-bearing child node
    pub fn add_mesh_node(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        local_transform: Transform,
        mesh: Arc<StaticMesh>,
    ) -> Option<NodeId> {
        let id = self.add_node(parent, name, local_transform)?;
        self.set_mesh(id, Some(mesh));
        Some(id)
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Look up a node mutably
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    /// Replace a node's mesh
    pub fn set_mesh(&mut self, id: NodeId, mesh: Option<Arc<StaticMesh>>) -> bool {
        self.nodes.get_mut(id).map(|n| n.mesh = mesh).is_some()
    }

    /// Replace a node's local transform
    pub fn set_local_transform(&mut self, id: NodeId, transform: Transform) -> bool {
        self.nodes.get_mut(id).map(|n| n.local_transform = transform).is_some()
    }

    /// Show or hide a node and its subtree
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        self.nodes.get_mut(id).map(|n| n.visible = visible).is_some()
    }

    /// Compose local transforms from the root down to `id`
    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        let node = self.nodes.get(id)?;
        match node.parent {
            Some(parent) => Some(self.world_transform(parent)?.combine(&node.local_transform)),
            None => Some(node.local_transform.clone()),
        }
    }

    /// Destroy a node and its whole subtree
    ///
    /// `listener` hears about every destroyed node, children before parents.
    /// The root cannot be destroyed. Returns the number of nodes removed.
    pub fn destroy_node(&mut self, id: NodeId, listener: &mut dyn NodeDestroyListener) -> usize {
        if id == self.root {
            log::warn!("Refusing to destroy the scene root");
            return 0;
        }
        let Some(parent) = self.nodes.get(id).map(|n| n.parent) else {
            return 0;
        };
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|child| *child != id);
        }

        let mut post_order = Vec::new();
        self.collect_post_order(id, &mut post_order);
        for node in &post_order {
            listener.on_node_destroyed(*node);
            self.nodes.remove(*node);
        }
        log::debug!("Destroyed {} scene node(s) under {id:?}", post_order.len());
        post_order.len()
    }

    fn collect_post_order(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(node) = self.nodes.get(id) {
            for child in &node.children {
                self.collect_post_order(*child, out);
            }
            out.push(id);
        }
    }

    fn visit_subtree(&self, id: NodeId, parent_world: &Transform, visitor: &mut dyn FnMut(MeshInstance<'_>)) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.visible {
            return;
        }

        let world = parent_world.combine(&node.local_transform);
        if let Some(mesh) = node.mesh.as_ref() {
            visitor(MeshInstance {
                node: id,
                mesh,
                world_transform: world.clone(),
            });
        }
        for child in &node.children {
            self.visit_subtree(*child, &world, visitor);
        }
    }
}

impl PaintScene for SceneTree {
    fn visit_visible_meshes(&self, visitor: &mut dyn FnMut(MeshInstance<'_>)) {
        self.visit_subtree(self.root, &Transform::identity(), visitor);
    }
}
